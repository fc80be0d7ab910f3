// handlers/categories.rs - /api/v1/categories handlers (admin only)

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use super::{duplicate_name, first_status, path_id, query_object};
use crate::auth::{self, RequestContext};
use crate::database::accessors::category;
use crate::database::models::{Category, CategoryPatch};
use crate::database::transaction;
use crate::error::ApiError;
use crate::middleware::JsonBody;
use crate::state::AppState;
use crate::validator::{self, Optional, Required};

const UNIQUE_NAME: &str = "MODEL:CATEGORY:CHECK_FOR_CATEGORY_UNIQUENESS:ALREADY_EXISTS";

#[derive(Deserialize)]
struct ListQuery {
    category_status: Vec<String>,
}

/// GET /categories?category_status=available,disabled
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<Category>>, ApiError> {
    let params: ListQuery = validator::validate_into(
        &query_object(query, &["category_status"]),
        &[("category_status", Required)],
    )?;
    auth::can_request(&ctx, "admin")?;

    let mut conn = state.pool.acquire().await?;
    let categories = category::list_by_status(&mut conn, &params.category_status).await?;

    Ok(Json(categories))
}

#[derive(Deserialize)]
struct CreateBody {
    name: String,
}

/// POST /categories
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Category>), ApiError> {
    let CreateBody { name } = validator::validate_into(&body, &[("name", Required)])?;
    auth::can_request(&ctx, "admin")?;

    let created = transaction::run(&state.pool, move |conn| {
        Box::pin(async move { category::create(conn, &name).await })
    })
    .await
    .map_err(|err| duplicate_name(err, UNIQUE_NAME))?;

    tracing::info!(category_id = created.id, "category created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[derive(Deserialize)]
struct PatchBody {
    category_status: Vec<String>,
    name: Option<String>,
}

/// PATCH /categories/{id}
///
/// Sets the status; a `name` in the same body renames the category too.
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<Category>, ApiError> {
    let id = path_id(&id)?;
    let PatchBody {
        category_status,
        name,
    } = validator::validate_into(
        &body,
        &[("category_status", Required), ("name", Optional)],
    )?;
    auth::can_request(&ctx, "admin")?;
    let status = first_status(category_status)?;

    let updated = transaction::run(&state.pool, move |conn| {
        Box::pin(async move {
            match name {
                Some(name) => {
                    let patch = CategoryPatch {
                        name: Some(name),
                        status: Some(status),
                    };
                    category::edit(conn, id, patch).await
                }
                None => category::set_status(conn, id, &status).await,
            }
        })
    })
    .await
    .map_err(|err| duplicate_name(err, UNIQUE_NAME))?;

    Ok(Json(updated))
}
