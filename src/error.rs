// HTTP API Error Types
use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::database::{error_codes, DatabaseError};

/// Client-facing fields shared by every domain error
#[derive(Debug, Clone, Default)]
pub struct ErrorDetails {
    pub message: String,
    pub action: String,
    pub error_location_code: Option<String>,
    pub key: Option<String>,
    pub error_type: Option<String>,
    /// Expire the `session_id` cookie alongside the error response
    pub clear_session_cookie: bool,
}

impl ErrorDetails {
    fn new(message: impl Into<String>, action: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            action: action.into(),
            ..Default::default()
        }
    }
}

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug, Error)]
pub enum ApiError {
    // 400 Bad Request
    #[error("{}", .0.message)]
    Validation(ErrorDetails),

    // 401 Unauthorized
    #[error("{}", .0.message)]
    Unauthorized(ErrorDetails),

    // 403 Forbidden
    #[error("{}", .0.message)]
    Forbidden(ErrorDetails),

    // 404 Not Found
    #[error("{}", .0.message)]
    NotFound(ErrorDetails),

    // 405 Method Not Allowed
    #[error("{}", .0.message)]
    MethodNotAllowed(ErrorDetails),

    /// Raw driver error; handlers map the known SQLSTATEs before it gets here
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    // 500 Internal Server Error
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

const VALIDATION_ACTION: &str = "Ajuste os dados enviados e tente novamente.";
const INTERNAL_MESSAGE: &str = "Um erro interno não esperado aconteceu.";
const INTERNAL_ACTION: &str = "Informe ao suporte o valor encontrado no campo \"error_id\".";

// Static constructor methods
impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::Validation(ErrorDetails::new(message, VALIDATION_ACTION))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(ErrorDetails::new(
            message,
            "Verifique se você está autenticado com uma sessão ativa e tente novamente.",
        ))
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(ErrorDetails::new(
            message,
            "Verifique se este usuário possui as features necessárias.",
        ))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(ErrorDetails::new(
            message,
            "Verifique se o caminho (PATH) e o método (GET, POST, PUT, DELETE) estão corretos.",
        ))
    }

    pub fn method_not_allowed(method: &str, path: &str) -> Self {
        ApiError::MethodNotAllowed(ErrorDetails::new(
            format!("Método \"{}\" não permitido para \"{}\".", method, path),
            "Utilize um método HTTP válido para este recurso.",
        ))
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(anyhow::anyhow!(message.into()))
    }
}

// Fluent setters; no-ops on Database/Internal since those never reach the client verbatim
impl ApiError {
    fn details_mut(&mut self) -> Option<&mut ErrorDetails> {
        match self {
            ApiError::Validation(d)
            | ApiError::Unauthorized(d)
            | ApiError::Forbidden(d)
            | ApiError::NotFound(d)
            | ApiError::MethodNotAllowed(d) => Some(d),
            ApiError::Database(_) | ApiError::Internal(_) => None,
        }
    }

    pub fn details(&self) -> Option<&ErrorDetails> {
        match self {
            ApiError::Validation(d)
            | ApiError::Unauthorized(d)
            | ApiError::Forbidden(d)
            | ApiError::NotFound(d)
            | ApiError::MethodNotAllowed(d) => Some(d),
            ApiError::Database(_) | ApiError::Internal(_) => None,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        if let Some(d) = self.details_mut() {
            d.action = action.into();
        }
        self
    }

    pub fn with_location(mut self, code: impl Into<String>) -> Self {
        if let Some(d) = self.details_mut() {
            d.error_location_code = Some(code.into());
        }
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        if let Some(d) = self.details_mut() {
            d.key = Some(key.into());
        }
        self
    }

    pub fn with_type(mut self, error_type: impl Into<String>) -> Self {
        if let Some(d) = self.details_mut() {
            d.error_type = Some(error_type.into());
        }
        self
    }

    pub fn clearing_session_cookie(mut self) -> Self {
        if let Some(d) = self.details_mut() {
            d.clear_session_cookie = true;
        }
        self
    }
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error class name exposed in the `name` field
    pub fn name(&self) -> &'static str {
        match self {
            ApiError::Validation(_) => "ValidationError",
            ApiError::Unauthorized(_) => "UnauthorizedError",
            ApiError::Forbidden(_) => "ForbiddenError",
            ApiError::NotFound(_) => "NotFoundError",
            ApiError::MethodNotAllowed(_) => "MethodNotAllowedError",
            ApiError::Database(_) | ApiError::Internal(_) => "InternalServerError",
        }
    }

    /// SQLSTATE of the underlying driver error, if any
    pub fn database_code(&self) -> Option<String> {
        match self {
            ApiError::Database(sqlx::Error::Database(e)) => e.code().map(|c| c.into_owned()),
            _ => None,
        }
    }

    /// Name of the violated constraint, if the driver reported one
    pub fn constraint(&self) -> Option<&str> {
        match self {
            ApiError::Database(sqlx::Error::Database(e)) => e.constraint(),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.database_code().as_deref() == Some(error_codes::UNIQUE_CONSTRAINT_VIOLATION)
    }

    pub fn is_foreign_key_violation(&self) -> bool {
        self.database_code().as_deref() == Some(error_codes::INVALID_FOREIGN_KEY)
    }

    /// Convert to the uniform wire body; `request_id` is stamped later by the metadata middleware
    pub fn to_body(&self, error_id: Uuid) -> ErrorBody {
        let (message, action, details) = match self.details() {
            Some(d) => (d.message.clone(), d.action.clone(), Some(d)),
            None => (INTERNAL_MESSAGE.to_string(), INTERNAL_ACTION.to_string(), None),
        };

        ErrorBody {
            name: self.name().to_string(),
            message,
            action,
            status_code: self.status_code().as_u16(),
            error_id,
            request_id: None,
            error_location_code: details.and_then(|d| d.error_location_code.clone()),
            key: details.and_then(|d| d.key.clone()),
            error_type: details.and_then(|d| d.error_type.clone()),
        }
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Sqlx(e) => ApiError::Database(e),
            other => ApiError::Internal(anyhow::Error::from(other)),
        }
    }
}

/// Uniform error response body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub name: String,
    pub message: String,
    pub action: String,
    pub status_code: u16,
    pub error_id: Uuid,
    pub request_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_location_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4();
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(%error_id, error = ?self, "unhandled error while processing request");
        } else {
            tracing::debug!(%error_id, name = self.name(), "request rejected: {}", self);
        }

        let body = self.to_body(error_id);
        let mut response = (status, Json(body.clone())).into_response();

        if self.details().is_some_and(|d| d.clear_session_cookie) {
            if let Ok(value) = HeaderValue::from_str(&crate::auth::cookie::clear_session_cookie()) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }

        response.extensions_mut().insert(body);
        response
    }
}
