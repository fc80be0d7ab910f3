// handlers/ingredients.rs - /api/v1/ingredients handlers (admin only)

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use super::{duplicate_name, path_id};
use crate::auth::{self, RequestContext};
use crate::database::accessors::ingredient;
use crate::database::models::{Ingredient, IngredientPatch, NewIngredient};
use crate::database::transaction;
use crate::error::ApiError;
use crate::middleware::JsonBody;
use crate::state::AppState;
use crate::validator::{self, Optional, Required};

const UNIQUE_NAME: &str = "MODEL:INGREDIENT:CHECK_FOR_INGREDIENT_UNIQUENESS:ALREADY_EXISTS";

/// GET /ingredients
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
) -> Result<Json<Vec<Ingredient>>, ApiError> {
    auth::can_request(&ctx, "admin")?;

    let mut conn = state.pool.acquire().await?;
    Ok(Json(ingredient::list(&mut conn).await?))
}

/// POST /ingredients
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Ingredient>), ApiError> {
    let values: NewIngredient = validator::validate_into(
        &body,
        &[("name", Required), ("value", Optional), ("price", Optional)],
    )?;
    auth::can_request(&ctx, "admin")?;

    let created = transaction::run(&state.pool, move |conn| {
        Box::pin(async move { ingredient::create(conn, values).await })
    })
    .await
    .map_err(|err| duplicate_name(err, UNIQUE_NAME))?;

    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /ingredients/{id}
pub async fn show(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
) -> Result<Json<Ingredient>, ApiError> {
    let id = path_id(&id)?;
    auth::can_request(&ctx, "admin")?;

    let mut conn = state.pool.acquire().await?;
    Ok(Json(ingredient::find_by_id(&mut conn, id).await?))
}

/// PATCH /ingredients/{id}
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<Ingredient>, ApiError> {
    let id = path_id(&id)?;
    let patch: IngredientPatch = validator::validate_into(
        &body,
        &[("name", Optional), ("value", Optional), ("price", Optional)],
    )?;
    auth::can_request(&ctx, "admin")?;

    let updated = transaction::run(&state.pool, move |conn| {
        Box::pin(async move { ingredient::edit(conn, id, patch).await })
    })
    .await
    .map_err(|err| duplicate_name(err, UNIQUE_NAME))?;

    Ok(Json(updated))
}
