use sqlx::PgConnection;

use crate::database::models::{Ingredient, IngredientPatch, NewIngredient};
use crate::error::ApiError;

pub async fn create(conn: &mut PgConnection, values: NewIngredient) -> Result<Ingredient, ApiError> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        r#"
        INSERT INTO ingredients (name, value, price)
        VALUES ($1, $2, $3)
        RETURNING *;
        "#,
    )
    .bind(values.name)
    .bind(values.value)
    .bind(values.price)
    .fetch_one(&mut *conn)
    .await?;

    Ok(ingredient)
}

pub async fn edit(
    conn: &mut PgConnection,
    id: i32,
    patch: IngredientPatch,
) -> Result<Ingredient, ApiError> {
    let current = find_by_id(&mut *conn, id).await?;

    let ingredient = sqlx::query_as::<_, Ingredient>(
        r#"
        UPDATE ingredients
        SET
          name = $2,
          value = $3,
          price = $4,
          updated_at = (now() at time zone 'utc')
        WHERE id = $1
        RETURNING *;
        "#,
    )
    .bind(id)
    .bind(patch.name.unwrap_or(current.name))
    .bind(patch.value.or(current.value))
    .bind(patch.price.or(current.price))
    .fetch_one(&mut *conn)
    .await?;

    Ok(ingredient)
}

pub async fn list(conn: &mut PgConnection) -> Result<Vec<Ingredient>, ApiError> {
    let ingredients = sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients ORDER BY id;")
        .fetch_all(&mut *conn)
        .await?;

    Ok(ingredients)
}

pub async fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<Ingredient, ApiError> {
    sqlx::query_as::<_, Ingredient>("SELECT * FROM ingredients WHERE id = $1;")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("O ingrediente não foi encontrado no sistema.")
                .with_action("Verifique se o \"id\" do ingrediente está digitado corretamente.")
                .with_location("MODEL:INGREDIENT:FIND_BY_ID:NOT_FOUND")
                .with_key("id")
        })
}
