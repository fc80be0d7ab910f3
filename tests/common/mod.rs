#![allow(dead_code)]

use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::{header, Client, Response, StatusCode};
use serde_json::{json, Value};
use tokio::sync::OnceCell;

pub const ADMIN_PASSWORD: &str = "senha-de-teste-123";

/// Server process owned by one test; killed when the test ends, pass or fail
pub struct TestServer {
    pub base_url: String,
    pub admin_username: String,
    admin_cookie: OnceCell<String>,
    child: Child,
}

impl Drop for TestServer {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

impl TestServer {
    fn spawn() -> Result<Self> {
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let base_url = format!("http://127.0.0.1:{}", port);

        // Servers share one database, so each bootstraps its own admin
        let admin_username = format!("admin{}", &uuid::Uuid::new_v4().simple().to_string()[..12]);

        let child = Command::new(env!("CARGO_BIN_EXE_bistro-api"))
            .env("PORT", port.to_string())
            .env("ADMIN_USERNAME", &admin_username)
            .env("ADMIN_PASSWORD", ADMIN_PASSWORD)
            .env("SECURITY_BCRYPT_COST", "4")
            .env("RUST_LOG", "warn")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .spawn()
            .context("failed to spawn server binary")?;

        Ok(Self {
            base_url,
            admin_username,
            admin_cookie: OnceCell::new(),
            child,
        })
    }

    async fn wait_ready(&self, timeout: Duration) -> Result<()> {
        let client = Client::new();
        let deadline = Instant::now() + timeout;
        while Instant::now() < deadline {
            if let Ok(resp) = client.get(self.url("/status")).send().await {
                if resp.status() == StatusCode::OK {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(150)).await;
        }
        anyhow::bail!("server did not become ready on {} within {:?}", self.base_url, timeout)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }
}

/// Fresh server for the calling test, or None when no database is configured
pub async fn server() -> Result<Option<TestServer>> {
    let _ = dotenvy::dotenv();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set; skipping");
        return Ok(None);
    }

    let server = TestServer::spawn()?;
    server.wait_ready(Duration::from_secs(20)).await?;
    Ok(Some(server))
}

pub fn client() -> Client {
    Client::new()
}

/// `session_id=<token>` taken from a response's Set-Cookie header
pub fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find(|value| value.starts_with("session_id="))
        .and_then(|value| value.split(';').next())
        .map(str::to_string)
}

pub async fn login(server: &TestServer, username: &str, password: &str) -> Result<Response> {
    Ok(client()
        .post(server.url("/sessions"))
        .json(&json!({ "username": username, "password": password }))
        .send()
        .await?)
}

/// Cookie of a logged-in admin, bootstrapping the account on first use
pub async fn admin_cookie(server: &TestServer) -> Result<String> {
    server
        .admin_cookie
        .get_or_try_init(|| async {
            let created = client().post(server.url("/users/admin")).send().await?;
            anyhow::ensure!(
                created.status() == StatusCode::CREATED,
                "admin bootstrap failed: {}",
                created.text().await?
            );

            let response = login(server, &server.admin_username, ADMIN_PASSWORD).await?;
            anyhow::ensure!(response.status() == StatusCode::CREATED, "admin login failed");
            session_cookie(&response).context("login did not set a session cookie")
        })
        .await
        .cloned()
}

/// Name that will not collide with rows left by earlier runs
pub fn unique_name(prefix: &str) -> String {
    format!("{} {}", prefix, &uuid::Uuid::new_v4().simple().to_string()[..10])
}

pub async fn admin_post(server: &TestServer, path: &str, body: Value) -> Result<(StatusCode, Value)> {
    let cookie = admin_cookie(server).await?;
    let response = client()
        .post(server.url(path))
        .header(header::COOKIE, cookie)
        .json(&body)
        .send()
        .await?;
    Ok((response.status(), response.json().await?))
}

pub async fn admin_patch(server: &TestServer, path: &str, body: Value) -> Result<(StatusCode, Value)> {
    let cookie = admin_cookie(server).await?;
    let response = client()
        .patch(server.url(path))
        .header(header::COOKIE, cookie)
        .json(&body)
        .send()
        .await?;
    Ok((response.status(), response.json().await?))
}

pub async fn admin_get(server: &TestServer, path: &str) -> Result<(StatusCode, Value)> {
    let cookie = admin_cookie(server).await?;
    let response = client()
        .get(server.url(path))
        .header(header::COOKIE, cookie)
        .send()
        .await?;
    Ok((response.status(), response.json().await?))
}

pub async fn create_ingredient(server: &TestServer, price: &str) -> Result<Value> {
    let (status, body) = admin_post(
        server,
        "/ingredients",
        json!({ "name": unique_name("Ingrediente"), "value": 10, "price": price }),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "ingredient not created: {}", body);
    Ok(body)
}

pub async fn create_product(server: &TestServer, ingredients_ids: &[i64]) -> Result<Value> {
    let (status, body) = admin_post(
        server,
        "/products",
        json!({
            "name": unique_name("Cappuccino"),
            "category": "coffees",
            "price": "12.50",
            "picture": "https://images.example.com/cappuccino.png",
            "ingredients_ids": ingredients_ids,
        }),
    )
    .await?;
    anyhow::ensure!(status == StatusCode::CREATED, "product not created: {}", body);
    Ok(body)
}

/// Direct database handle for arranging state the API cannot reach
pub async fn database() -> Result<sqlx::PgPool> {
    let url = std::env::var("DATABASE_URL").context("DATABASE_URL not set")?;
    Ok(sqlx::PgPool::connect(&url).await?)
}
