//! Session-cookie authentication and feature-based authorization.

pub mod context;
pub mod cookie;
pub mod password;

pub use context::RequestContext;

use crate::database::models::User;
use crate::error::ApiError;

/// Authorize the request's user for `feature`, returning that user
pub fn can_request<'a>(ctx: &'a RequestContext, feature: &str) -> Result<&'a User, ApiError> {
    let user = ctx.user.as_ref().ok_or_else(|| {
        ApiError::forbidden("Usuário não encontrado.")
            .with_action("Verifique se o usuário está logado.")
            .with_location("MODEL:AUTHORIZATION:CAN_REQUEST:USER_NOT_FOUND")
    })?;

    if !user.has_feature(feature) {
        tracing::debug!(user_id = user.id, feature, "feature missing");
        return Err(ApiError::forbidden("Usuário não pode executar esta operação.")
            .with_action(format!("Verifique se este usuário possui a feature \"{}\".", feature))
            .with_location("MODEL:AUTHORIZATION:CAN_REQUEST:FEATURE_NOT_FOUND"));
    }

    Ok(user)
}
