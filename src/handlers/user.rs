// handlers/user.rs - GET /api/v1/user, the current user with sliding session renewal

use axum::{
    extract::State,
    http::header,
    response::{AppendHeaders, IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};

use crate::auth::{cookie, RequestContext};
use crate::config;
use crate::database::accessors::session;
use crate::database::transaction;
use crate::error::ApiError;
use crate::state::AppState;

pub async fn show(State(state): State<AppState>, ctx: RequestContext) -> Result<Response, ApiError> {
    let current = ctx.require_session()?.clone();
    let Some(user) = ctx.user else {
        return Err(ApiError::unauthorized("Usuário não possui sessão ativa.")
            .with_location("CONTROLLER:USER:GET_HANDLER:USER_NOT_FOUND"));
    };

    let window = Duration::days(config::config().session.renew_window_days);
    if !current.expires_within(window, Utc::now()) {
        return Ok(Json(user).into_response());
    }

    let renewed = transaction::run(&state.pool, move |conn| {
        Box::pin(async move { session::renew(conn, &current).await })
    })
    .await?;

    tracing::info!(user_id = user.id, session_id = renewed.id, "session renewed");
    Ok((
        AppendHeaders([(header::SET_COOKIE, cookie::session_cookie(&renewed.token))]),
        Json(user),
    )
        .into_response())
}
