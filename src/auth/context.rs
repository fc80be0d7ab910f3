use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;

use super::cookie;
use crate::database::accessors::{session, user};
use crate::database::models::{Session, User};
use crate::error::ApiError;
use crate::middleware::RequestMetadata;
use crate::state::AppState;
use crate::validator::{self, Required};

/// Per-request identity. Built once by the extractor and never mutated;
/// `with_user` returns a new value.
#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: Uuid,
    pub user: Option<User>,
    pub session: Option<Session>,
}

impl RequestContext {
    pub fn anonymous(request_id: Uuid) -> Self {
        Self {
            request_id,
            user: None,
            session: None,
        }
    }

    pub fn with_user(self, user: User, session: Option<Session>) -> Self {
        Self {
            user: Some(user),
            session,
            ..self
        }
    }

    /// Session of an authenticated request
    pub fn require_session(&self) -> Result<&Session, ApiError> {
        self.session.as_ref().ok_or_else(no_active_session)
    }
}

#[derive(Deserialize)]
struct SessionCookie {
    session_id: String,
}

#[async_trait]
impl FromRequestParts<AppState> for RequestContext {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let request_id = parts
            .extensions
            .get::<RequestMetadata>()
            .map(|m| m.request_id)
            .unwrap_or_else(Uuid::new_v4);
        let ctx = RequestContext::anonymous(request_id);

        let Some(raw_token) = cookie::session_token(&parts.headers) else {
            return Ok(ctx);
        };

        let SessionCookie { session_id } = validator::validate_into(
            &json!({ "session_id": raw_token }),
            &[("session_id", Required)],
        )?;

        let mut conn = state.pool.acquire().await?;
        let session = session::find_valid_by_token(&mut conn, &session_id)
            .await?
            .ok_or_else(|| no_active_session().clearing_session_cookie())?;
        let user = user::find_by_id(&mut conn, session.user_id).await?;

        tracing::debug!(%request_id, user_id = user.id, "request authenticated");
        Ok(ctx.with_user(user, Some(session)))
    }
}

fn no_active_session() -> ApiError {
    ApiError::unauthorized("Usuário não possui sessão ativa.")
        .with_action("Verifique se este usuário está logado.")
        .with_location("MODEL:SESSION:FIND_VALID_BY_TOKEN:NOT_FOUND")
}
