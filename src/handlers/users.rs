// handlers/users.rs - /api/v1/users/admin: bootstrap and removal of accounts

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::auth::{self, password, RequestContext};
use crate::config;
use crate::database::accessors::user;
use crate::database::models::{NewUser, User, USER_FEATURES};
use crate::database::transaction;
use crate::error::ApiError;
use crate::middleware::JsonBody;
use crate::state::AppState;
use crate::validator::{self, Optional, Required};

#[derive(Deserialize)]
struct AdminAccount {
    username: String,
    password: String,
    #[serde(default)]
    features: Vec<String>,
}

/// POST /users/admin
///
/// The request body is ignored; the account comes from `ADMIN_USERNAME` and
/// `ADMIN_PASSWORD`.
pub async fn create_admin(State(state): State<AppState>) -> Result<(StatusCode, Json<User>), ApiError> {
    let admin = &config::config().admin;
    let mut values = Map::new();
    if let Some(username) = &admin.username {
        values.insert("username".to_string(), Value::from(username.as_str()));
    }
    if let Some(password) = &admin.password {
        values.insert("password".to_string(), Value::from(password.as_str()));
    }
    values.insert("features".to_string(), Value::from(USER_FEATURES.to_vec()));

    let account: AdminAccount = validator::validate_into(
        &Value::Object(values),
        &[("features", Optional), ("username", Required), ("password", Required)],
    )?;
    let password_hash = password::hash(account.password).await?;

    let created = transaction::run(&state.pool, move |conn| {
        Box::pin(async move {
            let created = user::create(
                &mut *conn,
                NewUser {
                    username: account.username,
                    password_hash,
                    features: Vec::new(),
                },
            )
            .await?;
            user::add_features(&mut *conn, created.id, &account.features).await
        })
    })
    .await
    .map_err(map_unique_username)?;

    tracing::info!(user_id = created.id, "admin account created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Deserialize)]
struct Removal {
    username: String,
}

/// DELETE /users/admin
pub async fn delete_admin(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(body): JsonBody,
) -> Result<Json<User>, ApiError> {
    let Removal { username } = validator::validate_into(&body, &[("username", Required)])?;
    auth::can_request(&ctx, "admin")?;

    let removed = transaction::run(&state.pool, move |conn| {
        Box::pin(async move { user::remove(conn, &username).await })
    })
    .await?;

    tracing::info!(user_id = removed.id, "user removed");
    Ok(Json(removed))
}

fn map_unique_username(err: ApiError) -> ApiError {
    if err.is_unique_violation() {
        return user::username_taken();
    }
    err
}
