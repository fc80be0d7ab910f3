// handlers/orders.rs - /api/v1/orders handlers
//
// Placing orders is public (tables order without logging in); listing and
// changing status are admin operations.

use axum::{
    extract::{Path, RawQuery, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{first_status, query_object};
use crate::auth::{self, RequestContext};
use crate::database::accessors::order;
use crate::database::models::{NewOrder, Order, OrderDetail};
use crate::database::transaction;
use crate::error::ApiError;
use crate::middleware::JsonBody;
use crate::state::AppState;
use crate::validator::{
    self,
    messages::{Label, Violation},
    Optional, Required, Requiredness,
};

const ORDER_FIELDS: &[(&str, Requiredness)] = &[
    ("order_id", Required),
    ("product_id", Required),
    ("price", Required),
    ("table_number", Required),
    ("observation", Optional),
    ("additional_ingredients", Optional),
    ("removed_ingredients", Optional),
];

const INGREDIENT_FOREIGN_KEYS: &[&str] = &[
    "additional_ingredients_ingredient_id_fkey",
    "removed_ingredients_ingredient_id_fkey",
];

#[derive(Deserialize)]
struct ListQuery {
    order_status: Vec<String>,
}

/// GET /orders?order_status=pending,accepted
pub async fn list(
    State(state): State<AppState>,
    ctx: RequestContext,
    RawQuery(query): RawQuery,
) -> Result<Json<Vec<OrderDetail>>, ApiError> {
    let params: ListQuery = validator::validate_into(
        &query_object(query, &["order_status"]),
        &[("order_status", Required)],
    )?;
    auth::can_request(&ctx, "admin")?;

    let mut conn = state.pool.acquire().await?;
    Ok(Json(order::list_by_status(&mut conn, &params.order_status).await?))
}

/// POST /orders
///
/// Accepts one order object or a non-empty array of them; a batch commits or
/// rolls back as a whole.
pub async fn create(
    State(state): State<AppState>,
    JsonBody(body): JsonBody,
) -> Result<Response, ApiError> {
    let (orders, batch) = match &body {
        Value::Array(items) if items.is_empty() => {
            return Err(Violation::array_min(&Label::field("body"), 1).into());
        }
        Value::Array(items) => (
            items
                .iter()
                .map(|item| validator::validate_into::<NewOrder>(item, ORDER_FIELDS))
                .collect::<Result<Vec<_>, _>>()?,
            true,
        ),
        single => (vec![validator::validate_into::<NewOrder>(single, ORDER_FIELDS)?], false),
    };

    let created = transaction::run(&state.pool, move |conn| {
        Box::pin(async move {
            let mut created = Vec::with_capacity(orders.len());
            for values in &orders {
                let row = order::create(&mut *conn, values).await?;
                order::set_ingredients(
                    &mut *conn,
                    row.id,
                    &values.additional_ingredients,
                    &values.removed_ingredients,
                )
                .await?;
                created.push(order::find_by_id(&mut *conn, row.id).await?);
            }
            Ok::<_, ApiError>(created)
        })
    })
    .await
    .map_err(map_create_error)?;

    tracing::info!(count = created.len(), "orders placed");

    if batch {
        return Ok((StatusCode::CREATED, Json(created)).into_response());
    }
    match created.into_iter().next() {
        Some(single) => Ok((StatusCode::CREATED, Json(single)).into_response()),
        None => Err(ApiError::internal("order insert returned no rows")),
    }
}

#[derive(Deserialize)]
struct BatchKey {
    order_id: String,
}

#[derive(Deserialize)]
struct PatchBody {
    order_status: Vec<String>,
}

/// PATCH /orders/{order_id}
///
/// Moves every line placed under the batch's `order_id` at once.
pub async fn update(
    State(state): State<AppState>,
    ctx: RequestContext,
    Path(raw_order_id): Path<String>,
    JsonBody(body): JsonBody,
) -> Result<Json<Vec<Order>>, ApiError> {
    let BatchKey { order_id } =
        validator::validate_into(&json!({ "order_id": raw_order_id }), &[("order_id", Required)])?;
    let PatchBody { order_status } =
        validator::validate_into(&body, &[("order_status", Required)])?;
    auth::can_request(&ctx, "admin")?;
    let status = first_status(order_status)?;

    let updated = transaction::run(&state.pool, move |conn| {
        Box::pin(async move { order::set_status(conn, &order_id, &status).await })
    })
    .await?;

    tracing::info!(count = updated.len(), "order batch updated");
    Ok(Json(updated))
}

fn map_create_error(err: ApiError) -> ApiError {
    if !err.is_foreign_key_violation() {
        return err;
    }

    if err
        .constraint()
        .is_some_and(|name| INGREDIENT_FOREIGN_KEYS.contains(&name))
    {
        return ApiError::not_found("O ingrediente selecionado não foi encontrado.")
            .with_action("Verifique o \"ingredient_id\" utilizado e tente novamente.")
            .with_location("MODEL:ORDER:CHECK_FOR_ORDER_INGREDIENT_ID:NOT_FOUND")
            .with_key("ingredient_id");
    }

    ApiError::not_found("O produto selecionado não foi encontrado.")
        .with_action("Verifique o \"product_id\" utilizado e tente novamente.")
        .with_location("MODEL:ORDER:CHECK_FOR_ORDER_PRODUCT_ID:NOT_FOUND")
        .with_key("product_id")
}
