// handlers/products.rs - /api/v1/products handlers
//
// Reads are public (the customer menu); writes require the "admin" feature.

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::{duplicate_name, path_id, query_object};
use crate::auth::{self, RequestContext};
use crate::database::accessors::product;
use crate::database::models::{NewProduct, Product, ProductDetail, ProductPatch};
use crate::database::transaction;
use crate::error::ApiError;
use crate::middleware::JsonBody;
use crate::state::AppState;
use crate::validator::{self, Optional, Required};

const UNIQUE_NAME: &str = "MODEL:PRODUCT:CHECK_FOR_PRODUCT_UNIQUENESS:ALREADY_EXISTS";

#[derive(Deserialize)]
struct ListQuery {
    category: String,
    product_status: Vec<String>,
}

/// GET /products?category=coffees&product_status=available,missing
pub async fn list(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<Product>>, ApiError> {
    let params: ListQuery = validator::validate_into(
        &query_object(query, &["product_status"]),
        &[("category", Required), ("product_status", Required)],
    )?;

    let mut conn = state.pool.acquire().await?;
    let products =
        product::list_by_category_and_status(&mut conn, &params.category, &params.product_status)
            .await?;

    Ok(Json(products))
}

/// POST /products
pub async fn create(
    State(state): State<AppState>,
    ctx: RequestContext,
    JsonBody(body): JsonBody,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let values: NewProduct = validator::validate_into(
        &body,
        &[
            ("ingredients_ids", Optional),
            ("name", Required),
            ("category", Required),
            ("category_id", Optional),
            ("price", Required),
            ("picture", Required),
        ],
    )?;
    auth::can_request(&ctx, "admin")?;

    let created = transaction::run(&state.pool, move |conn| {
        Box::pin(async move { product::create(conn, values).await })
    })
    .await
    .map_err(map_write_error)?;

    tracing::info!(product_id = created.id, "product created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /products/{id}
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProductDetail>, ApiError> {
    let id = path_id(&id)?;

    let mut conn = state.pool.acquire().await?;
    Ok(Json(product::find_by_id(&mut conn, id).await?))
}

#[derive(Deserialize)]
struct PatchBody {
    ingredients_ids: Option<Vec<i32>>,
    name: Option<String>,
    category: Option<String>,
    category_id: Option<i32>,
    price: Option<Decimal>,
    picture: Option<String>,
    product_status: Option<Vec<String>>,
}

impl From<PatchBody> for ProductPatch {
    fn from(body: PatchBody) -> Self {
        ProductPatch {
            ingredients_ids: body.ingredients_ids,
            name: body.name,
            category: body.category,
            category_id: body.category_id,
            status: body.product_status.and_then(|s| s.into_iter().next()),
            price: body.price,
            picture: body.picture,
        }
    }
}

/// PATCH /products/{id}
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<Product>, ApiError> {
    let id = path_id(&id)?;
    let body: PatchBody = validator::validate_into(
        &body,
        &[
            ("ingredients_ids", Optional),
            ("name", Optional),
            ("category", Optional),
            ("category_id", Optional),
            ("price", Optional),
            ("picture", Optional),
            ("product_status", Optional),
        ],
    )?;
    auth::can_request(&ctx, "admin")?;
    let patch = ProductPatch::from(body);

    let updated = transaction::run(&state.pool, move |conn| {
        Box::pin(async move { product::edit(conn, id, patch).await })
    })
    .await
    .map_err(map_write_error)?;

    Ok(Json(updated))
}

fn map_write_error(err: ApiError) -> ApiError {
    if err.is_foreign_key_violation() {
        return ApiError::not_found("A categoria selecionada não foi encontrada.")
            .with_action("Verifique a \"category_id\" utilizada e tente novamente.")
            .with_location("MODEL:PRODUCT:CHECK_FOR_CATEGORY_ID:NOT_FOUND")
            .with_key("category_id");
    }
    duplicate_name(err, UNIQUE_NAME)
}
