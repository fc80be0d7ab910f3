use sqlx::PgConnection;

use crate::database::models::{NewUser, User};
use crate::error::ApiError;

pub async fn create(conn: &mut PgConnection, values: NewUser) -> Result<User, ApiError> {
    validate_unique_username(&mut *conn, &values.username).await?;

    let user = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, password, features)
        VALUES ($1, $2, $3)
        RETURNING *;
        "#,
    )
    .bind(values.username)
    .bind(values.password_hash)
    .bind(values.features)
    .fetch_one(&mut *conn)
    .await?;

    Ok(user)
}

/// Delete by username (case-insensitive) and return the removed row
pub async fn remove(conn: &mut PgConnection, username: &str) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(
        r#"
        DELETE FROM users
        WHERE LOWER(username) = LOWER($1)
        RETURNING *;
        "#,
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| username_not_found("MODEL:USER:REMOVE:NOT_FOUND"))
}

pub async fn find_by_username(conn: &mut PgConnection, username: &str) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT *
        FROM users
        WHERE LOWER(username) = LOWER($1)
        LIMIT 1;
        "#,
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| username_not_found("MODEL:USER:FIND_BY_USERNAME:NOT_FOUND"))
}

pub async fn find_by_id(conn: &mut PgConnection, id: i32) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1;")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| {
            ApiError::not_found("O usuário informado não foi encontrado no sistema.")
                .with_action("Verifique se o \"id\" está digitado corretamente.")
                .with_location("MODEL:USER:FIND_BY_ID:NOT_FOUND")
                .with_key("id")
        })
}

/// Append features; ones the user already has are not duplicated
pub async fn add_features(
    conn: &mut PgConnection,
    id: i32,
    features: &[String],
) -> Result<User, ApiError> {
    sqlx::query_as::<_, User>(
        r#"
        UPDATE users
        SET
          features = ARRAY(
            SELECT DISTINCT unnest(array_cat(features, $2::varchar[]))
          ),
          updated_at = (now() at time zone 'utc')
        WHERE id = $1
        RETURNING *;
        "#,
    )
    .bind(id)
    .bind(features)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| {
        ApiError::not_found("O usuário informado não foi encontrado no sistema.")
            .with_location("MODEL:USER:ADD_FEATURES:NOT_FOUND")
            .with_key("id")
    })
}

pub async fn validate_unique_username(
    conn: &mut PgConnection,
    username: &str,
) -> Result<(), ApiError> {
    let existing: Option<String> = sqlx::query_scalar(
        "SELECT username FROM users WHERE LOWER(username) = LOWER($1);",
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await?;

    match existing {
        Some(_) => Err(username_taken()),
        None => Ok(()),
    }
}

/// Raised by the pre-insert check, and by callers for a unique violation that
/// slips past it under concurrent inserts
pub fn username_taken() -> ApiError {
    ApiError::validation("O \"username\" informado já está sendo usado.")
        .with_location("MODEL:USER:VALIDATE_UNIQUE_USERNAME:ALREADY_EXISTS")
        .with_key("username")
}

fn username_not_found(location: &str) -> ApiError {
    ApiError::not_found("O usuário informado não foi encontrado no sistema.")
        .with_action("Verifique se o username está digitado corretamente.")
        .with_location(location)
        .with_key("username")
}
