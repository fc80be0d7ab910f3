//! Router assembly: every resource lives under `/api/v1`.

use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{get, MethodRouter},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config;
use crate::handlers::{
    categories, fallback, ingredients, orders, products, sessions, status, user, users,
};
use crate::middleware::request_metadata_middleware;
use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .fallback(fallback::not_found)
        .layer(axum_middleware::from_fn(request_metadata_middleware))
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(catalog_routes())
        .merge(order_routes())
        .merge(account_routes())
        .route("/status", known(get(status::show)))
}

fn catalog_routes() -> Router<AppState> {
    use axum::routing::patch;

    Router::new()
        .route("/categories", known(get(categories::list).post(categories::create)))
        .route("/categories/:id", known(patch(categories::update)))
        .route("/ingredients", known(get(ingredients::list).post(ingredients::create)))
        .route(
            "/ingredients/:id",
            known(get(ingredients::show).patch(ingredients::update)),
        )
        .route("/products", known(get(products::list).post(products::create)))
        .route("/products/:id", known(get(products::show).patch(products::update)))
}

fn order_routes() -> Router<AppState> {
    use axum::routing::patch;

    Router::new()
        .route("/orders", known(get(orders::list).post(orders::create)))
        .route("/orders/:order_id", known(patch(orders::update)))
}

fn account_routes() -> Router<AppState> {
    use axum::routing::post;

    Router::new()
        .route("/sessions", known(post(sessions::create).delete(sessions::delete)))
        .route("/user", known(get(user::show)))
        .route(
            "/users/admin",
            known(post(users::create_admin).delete(users::delete_admin)),
        )
}

/// Known path, unsupported method: answer 405 with an error body
fn known(route: MethodRouter<AppState>) -> MethodRouter<AppState> {
    route.fallback(fallback::method_not_allowed)
}

/// Explicit origins only; `AppConfig::validate` refuses a wildcard at startup
fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter(|origin| origin.as_str() != "*")
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::COOKIE])
        .allow_credentials(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    // Lazy pool: routes exercised here reject before touching the database
    fn test_app() -> Router {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://bistro@localhost/unused")
            .unwrap();
        app(AppState::new(pool))
    }

    async fn send(method: Method, uri: &str) -> (StatusCode, Value) {
        let response = test_app()
            .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        assert!(response.headers().contains_key("x-request-id"));
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn unknown_paths_are_not_found() {
        let (status, body) = send(Method::GET, "/api/v1/menu").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["name"], "NotFoundError");
        assert!(body["request_id"].is_string());
    }

    #[tokio::test]
    async fn unsupported_methods_are_rejected() {
        let (status, body) = send(Method::PUT, "/api/v1/categories").await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(body["name"], "MethodNotAllowedError");
        assert_eq!(body["status_code"], 405);
    }

    #[tokio::test]
    async fn admin_routes_validate_before_authorizing() {
        let (status, body) = send(Method::GET, "/api/v1/orders?order_status=lost").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["type"], "any.only");
        assert_eq!(body["key"], "object");
    }

    #[tokio::test]
    async fn anonymous_admin_requests_are_forbidden() {
        let (status, body) = send(Method::GET, "/api/v1/categories?category_status=available").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(
            body["error_location_code"],
            "MODEL:AUTHORIZATION:CAN_REQUEST:USER_NOT_FOUND"
        );
    }
}
