use chrono::{Duration, Utc};
use rand::RngCore;
use sqlx::PgConnection;

use crate::config;
use crate::database::models::Session;
use crate::error::ApiError;

/// 48 random bytes rendered as 96 lowercase hex characters
pub fn generate_token() -> String {
    let mut bytes = [0u8; 48];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

pub async fn create(conn: &mut PgConnection, user_id: i32) -> Result<Session, ApiError> {
    let expires_at = Utc::now() + Duration::days(config::config().session.expiry_days);

    let session = sqlx::query_as::<_, Session>(
        r#"
        INSERT INTO sessions (token, user_id, expires_at)
        VALUES ($1, $2, $3)
        RETURNING *;
        "#,
    )
    .bind(generate_token())
    .bind(user_id)
    .bind(expires_at)
    .fetch_one(&mut *conn)
    .await?;

    Ok(session)
}

/// Session for `token` that has not expired yet
pub async fn find_valid_by_token(
    conn: &mut PgConnection,
    token: &str,
) -> Result<Option<Session>, ApiError> {
    let session = sqlx::query_as::<_, Session>(
        r#"
        SELECT *
        FROM sessions
        WHERE token = $1 AND expires_at > now()
        LIMIT 1;
        "#,
    )
    .bind(token)
    .fetch_optional(&mut *conn)
    .await?;

    Ok(session)
}

/// Mint a replacement session for the same user and expire the old one
pub async fn renew(conn: &mut PgConnection, old: &Session) -> Result<Session, ApiError> {
    let fresh = create(&mut *conn, old.user_id).await?;
    expire_by_id(&mut *conn, old.id).await?;
    Ok(fresh)
}

pub async fn expire_by_id(conn: &mut PgConnection, id: i32) -> Result<Session, ApiError> {
    sqlx::query_as::<_, Session>(
        r#"
        UPDATE sessions
        SET
          expires_at = created_at - interval '1 year',
          updated_at = (now() at time zone 'utc')
        WHERE id = $1
        RETURNING *;
        "#,
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| {
        ApiError::not_found("A sessão não foi encontrada no sistema.")
            .with_location("MODEL:SESSION:EXPIRE_BY_ID:NOT_FOUND")
            .with_key("id")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_96_hex_chars() {
        let token = generate_token();
        assert_eq!(token.len(), 96);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn tokens_are_not_repeated() {
        assert_ne!(generate_token(), generate_token());
    }
}
