use std::time::Instant;

use axum::{
    body::Body,
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use crate::error::ErrorBody;

pub const X_REQUEST_ID: &str = "x-request-id";

/// Request identity inserted into extensions before any handler runs
#[derive(Clone, Debug)]
pub struct RequestMetadata {
    pub request_id: Uuid,
    pub method: Method,
    pub path: String,
}

/// Tags every request with a v4 id, stamps it into error bodies and the
/// `x-request-id` header, and logs one line per request
pub async fn request_metadata_middleware(mut request: Request, next: Next) -> Response {
    let metadata = RequestMetadata {
        request_id: Uuid::new_v4(),
        method: request.method().clone(),
        path: request.uri().path().to_string(),
    };
    request.extensions_mut().insert(metadata.clone());

    let started = Instant::now();
    let mut response = next.run(request).await;

    if let Some(mut body) = response.extensions_mut().remove::<ErrorBody>() {
        body.request_id = Some(metadata.request_id);
        response = replace_error_body(response, &body);
    }

    if let Ok(value) = HeaderValue::from_str(&metadata.request_id.to_string()) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }

    tracing::info!(
        request_id = %metadata.request_id,
        method = %metadata.method,
        path = %metadata.path,
        status = response.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request completed"
    );

    response
}

fn replace_error_body(response: Response, body: &ErrorBody) -> Response {
    let Ok(bytes) = serde_json::to_vec(body) else {
        return response;
    };
    let (mut parts, _) = response.into_parts();
    parts.headers.remove(header::CONTENT_LENGTH);
    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use axum::{body::to_bytes, middleware, response::IntoResponse, routing::get, Router};
    use tower::ServiceExt;

    async fn failing() -> ApiError {
        ApiError::not_found("nada aqui")
    }

    async fn ok() -> &'static str {
        "ok"
    }

    fn router() -> Router {
        Router::new()
            .route("/fail", get(failing))
            .route("/ok", get(ok))
            .layer(middleware::from_fn(request_metadata_middleware))
    }

    #[tokio::test]
    async fn error_bodies_carry_the_request_id_header_value() {
        let response = router()
            .oneshot(Request::builder().uri("/fail").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let header_id = response.headers().get("x-request-id").unwrap().to_str().unwrap().to_string();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["request_id"], header_id);
        assert_eq!(body["status_code"], 404);
        assert_ne!(body["error_id"], body["request_id"]);
    }

    #[tokio::test]
    async fn successful_responses_get_the_header_only() {
        let response = router()
            .oneshot(Request::builder().uri("/ok").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(response.headers().contains_key("x-request-id"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"ok");
    }

    #[test]
    fn replaced_body_drops_stale_length() {
        let mut response = ApiError::validation("x").into_response();
        let body = response.extensions_mut().remove::<ErrorBody>().unwrap();
        let replaced = replace_error_body(response, &body);
        assert!(replaced.headers().get(header::CONTENT_LENGTH).is_none());
    }
}
