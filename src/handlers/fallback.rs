// handlers/fallback.rs - 404 / 405 responses for unmatched requests

use axum::http::{Method, Uri};

use crate::error::ApiError;

/// Router-level fallback for unknown paths
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found("Não foi possível encontrar este recurso no sistema.")
        .with_action("Verifique se o caminho (PATH) está correto.")
        .with_location(format!("CONTROLLER:ON_NO_MATCH:{}", uri.path()))
}

/// Per-route fallback for methods the path does not implement
pub async fn method_not_allowed(method: Method, uri: Uri) -> ApiError {
    ApiError::method_not_allowed(method.as_str(), uri.path())
}
