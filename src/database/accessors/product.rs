use sqlx::PgConnection;

use crate::database::models::{NewProduct, Product, ProductDetail, ProductPatch};
use crate::error::ApiError;

pub async fn create(conn: &mut PgConnection, values: NewProduct) -> Result<Product, ApiError> {
    let product = sqlx::query_as::<_, Product>(
        r#"
        INSERT INTO products (ingredients_ids, name, category, category_id, price, picture)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *;
        "#,
    )
    .bind(values.ingredients_ids)
    .bind(values.name)
    .bind(values.category)
    .bind(values.category_id)
    .bind(values.price)
    .bind(values.picture)
    .fetch_one(&mut *conn)
    .await?;

    Ok(product)
}

pub async fn edit(
    conn: &mut PgConnection,
    id: i32,
    patch: ProductPatch,
) -> Result<Product, ApiError> {
    let current = find_by_id(&mut *conn, id).await?.product;

    let product = sqlx::query_as::<_, Product>(
        r#"
        UPDATE products
        SET
          ingredients_ids = $2,
          name = $3,
          category = $4,
          category_id = $5,
          status = $6,
          price = $7,
          picture = $8,
          updated_at = (now() at time zone 'utc')
        WHERE id = $1
        RETURNING *;
        "#,
    )
    .bind(id)
    .bind(patch.ingredients_ids.unwrap_or(current.ingredients_ids))
    .bind(patch.name.unwrap_or(current.name))
    .bind(patch.category.unwrap_or(current.category))
    .bind(patch.category_id.or(current.category_id))
    .bind(patch.status.unwrap_or(current.status))
    .bind(patch.price.unwrap_or(current.price))
    .bind(patch.picture.or(current.picture))
    .fetch_one(&mut *conn)
    .await?;

    Ok(product)
}

/// Product with its ingredients joined in `ingredients_ids` order
pub async fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<ProductDetail, ApiError> {
    sqlx::query_as::<_, ProductDetail>(
        r#"
        SELECT
          p.*,
          COALESCE(
            (SELECT json_agg(
              json_build_object(
                'id', i.id,
                'name', i.name,
                'value', i.value,
                'price', i.price::text
              )
              ORDER BY array_position(p.ingredients_ids, i.id)
            )
            FROM ingredients i
            WHERE i.id = ANY(p.ingredients_ids)),
            '[]'
          ) AS ingredients
        FROM products p
        WHERE p.id = $1;
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| {
        ApiError::not_found("O produto não foi encontrado no sistema.")
            .with_action("Verifique se o \"id\" do produto está digitado corretamente.")
            .with_location("MODEL:PRODUCT:FIND_BY_ID:NOT_FOUND")
            .with_key("id")
    })
}

pub async fn list_by_category_and_status(
    conn: &mut PgConnection,
    category: &str,
    statuses: &[String],
) -> Result<Vec<Product>, ApiError> {
    let products = sqlx::query_as::<_, Product>(
        r#"
        SELECT *
        FROM products
        WHERE category = $1 AND status = ANY($2)
        ORDER BY id;
        "#,
    )
    .bind(category)
    .bind(statuses)
    .fetch_all(&mut *conn)
    .await?;

    Ok(products)
}
