use sqlx::PgConnection;

use crate::database::models::{Category, CategoryPatch};
use crate::error::ApiError;

pub async fn create(conn: &mut PgConnection, name: &str) -> Result<Category, ApiError> {
    let category = sqlx::query_as::<_, Category>(
        r#"
        INSERT INTO categories (name)
        VALUES ($1)
        RETURNING *;
        "#,
    )
    .bind(name)
    .fetch_one(&mut *conn)
    .await?;

    Ok(category)
}

/// Read-modify-write: unspecified fields keep their stored value
pub async fn edit(
    conn: &mut PgConnection,
    id: i32,
    patch: CategoryPatch,
) -> Result<Category, ApiError> {
    let current = find_by_id(&mut *conn, id).await?;
    let name = patch.name.unwrap_or(current.name);
    let status = patch.status.unwrap_or(current.status);

    let category = sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET
          name = $2,
          status = $3,
          updated_at = (now() at time zone 'utc')
        WHERE id = $1
        RETURNING *;
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(status)
    .fetch_one(&mut *conn)
    .await?;

    Ok(category)
}

pub async fn list_by_status(
    conn: &mut PgConnection,
    statuses: &[String],
) -> Result<Vec<Category>, ApiError> {
    let categories = sqlx::query_as::<_, Category>(
        r#"
        SELECT *
        FROM categories
        WHERE status = ANY($1)
        ORDER BY id;
        "#,
    )
    .bind(statuses)
    .fetch_all(&mut *conn)
    .await?;

    Ok(categories)
}

pub async fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<Category, ApiError> {
    sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1;")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(not_found)
}

pub async fn set_status(
    conn: &mut PgConnection,
    id: i32,
    status: &str,
) -> Result<Category, ApiError> {
    sqlx::query_as::<_, Category>(
        r#"
        UPDATE categories
        SET status = $2, updated_at = (now() at time zone 'utc')
        WHERE id = $1
        RETURNING *;
        "#,
    )
    .bind(id)
    .bind(status)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(not_found)
}

fn not_found() -> ApiError {
    ApiError::not_found("A categoria não foi encontrada no sistema.")
        .with_action("Verifique se o \"id\" da categoria está digitado corretamente.")
        .with_location("MODEL:CATEGORY:FIND_BY_ID:NOT_FOUND")
        .with_key("id")
}
