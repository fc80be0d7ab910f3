use sqlx::PgConnection;

use crate::database::models::{AdditionalIngredient, NewOrder, Order, OrderDetail};
use crate::error::ApiError;

/// Shared projection for order reads: the row plus its product and ingredient aggregates
const ORDER_DETAIL_SELECT: &str = r#"
    SELECT
      o.*,
      COALESCE(
        (SELECT json_agg(
          json_build_object('name', p.name, 'price', p.price::text)
        )
        FROM products p
        WHERE p.id = o.product_id),
        '[]'
      ) AS product,
      COALESCE(
        (SELECT json_agg(
          json_build_object(
            'name', i.name,
            'multiplied', ai.multiplied,
            'price', ai.price::text
          )
          ORDER BY ai.id
        )
        FROM additional_ingredients ai
        JOIN ingredients i ON i.id = ai.ingredient_id
        WHERE ai.order_id = o.id),
        '[]'
      ) AS additional_ingredients,
      COALESCE(
        (SELECT json_agg(json_build_object('name', ri.name) ORDER BY r.id)
        FROM removed_ingredients r
        JOIN ingredients ri ON ri.id = r.ingredient_id
        WHERE r.order_id = o.id),
        '[]'
      ) AS removed_ingredients
    FROM orders o
"#;

pub async fn create(conn: &mut PgConnection, values: &NewOrder) -> Result<Order, ApiError> {
    let order = sqlx::query_as::<_, Order>(
        r#"
        INSERT INTO orders (order_id, product_id, price, table_number, observation)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *;
        "#,
    )
    .bind(&values.order_id)
    .bind(values.product_id)
    .bind(values.price)
    .bind(values.table_number)
    .bind(&values.observation)
    .fetch_one(&mut *conn)
    .await?;

    Ok(order)
}

/// Insert add-ons and opt-outs for `order_id`, one statement per entry in order
pub async fn set_ingredients(
    conn: &mut PgConnection,
    order_id: i32,
    additional: &[AdditionalIngredient],
    removed: &[i32],
) -> Result<(), ApiError> {
    for item in additional {
        sqlx::query(
            r#"
            INSERT INTO additional_ingredients (ingredient_id, order_id, multiplied, price)
            VALUES ($1, $2, $3, $4);
            "#,
        )
        .bind(item.ingredient_id)
        .bind(order_id)
        .bind(item.multiplied)
        .bind(item.price)
        .execute(&mut *conn)
        .await?;
    }

    for ingredient_id in removed {
        sqlx::query(
            r#"
            INSERT INTO removed_ingredients (ingredient_id, order_id)
            VALUES ($1, $2);
            "#,
        )
        .bind(ingredient_id)
        .bind(order_id)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn list_by_status(
    conn: &mut PgConnection,
    statuses: &[String],
) -> Result<Vec<OrderDetail>, ApiError> {
    let query = format!("{} WHERE o.status = ANY($1) ORDER BY o.id;", ORDER_DETAIL_SELECT);

    let orders = sqlx::query_as::<_, OrderDetail>(&query)
        .bind(statuses)
        .fetch_all(&mut *conn)
        .await?;

    Ok(orders)
}

pub async fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<OrderDetail, ApiError> {
    let query = format!("{} WHERE o.id = $1;", ORDER_DETAIL_SELECT);

    sqlx::query_as::<_, OrderDetail>(&query)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| not_found("id"))
}

/// Move every line of the `order_id` batch to `status`
pub async fn set_status(
    conn: &mut PgConnection,
    order_id: &str,
    status: &str,
) -> Result<Vec<Order>, ApiError> {
    let orders = sqlx::query_as::<_, Order>(
        r#"
        UPDATE orders
        SET status = $2, updated_at = (now() at time zone 'utc')
        WHERE order_id = $1
        RETURNING *;
        "#,
    )
    .bind(order_id)
    .bind(status)
    .fetch_all(&mut *conn)
    .await?;

    if orders.is_empty() {
        return Err(not_found("order_id"));
    }
    Ok(orders)
}

fn not_found(key: &str) -> ApiError {
    ApiError::not_found("O pedido não foi encontrado no sistema.")
        .with_action(format!("Verifique se o \"{}\" do pedido está digitado corretamente.", key))
        .with_location("MODEL:ORDER:FIND_BY_ID:NOT_FOUND")
        .with_key(key)
}
