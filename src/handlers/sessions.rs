// handlers/sessions.rs - /api/v1/sessions handlers (login / logout)

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use serde::Deserialize;

use crate::auth::{cookie, password, RequestContext};
use crate::database::accessors::{session, user};
use crate::database::transaction;
use crate::error::ApiError;
use crate::middleware::JsonBody;
use crate::state::AppState;
use crate::validator::{self, Required};

#[derive(Deserialize)]
struct Credentials {
    username: String,
    password: String,
}

/// POST /sessions
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<impl IntoResponse, ApiError> {
    let credentials: Credentials =
        validator::validate_into(&body, &[("username", Required), ("password", Required)])?;

    let stored = {
        let mut conn = state.pool.acquire().await?;
        match user::find_by_username(&mut conn, &credentials.username).await {
            Ok(found) => found,
            Err(ApiError::NotFound(_)) => return Err(data_mismatch()),
            Err(err) => return Err(err),
        }
    };

    if !password::verify(credentials.password, stored.password.clone()).await? {
        tracing::info!(user_id = stored.id, "login rejected");
        return Err(data_mismatch());
    }

    let user_id = stored.id;
    let created = transaction::run(&state.pool, move |conn| {
        Box::pin(async move { session::create(conn, user_id).await })
    })
    .await?;

    tracing::info!(user_id, session_id = created.id, "session created");
    Ok((
        StatusCode::CREATED,
        AppendHeaders([(header::SET_COOKIE, cookie::session_cookie(&created.token))]),
        Json(created),
    ))
}

/// DELETE /sessions
pub async fn delete(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<impl IntoResponse, ApiError> {
    let id = ctx
        .require_session()
        .map_err(ApiError::clearing_session_cookie)?
        .id;

    let expired = transaction::run(&state.pool, move |conn| {
        Box::pin(async move { session::expire_by_id(conn, id).await })
    })
    .await?;

    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie::clear_session_cookie())]),
        Json(expired),
    ))
}

fn data_mismatch() -> ApiError {
    ApiError::unauthorized("Dados não conferem.")
        .with_action("Verifique se os dados enviados estão corretos.")
        .with_location("CONTROLLER:SESSIONS:POST_HANDLER:DATA_MISMATCH")
}
