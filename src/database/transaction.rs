use futures::future::BoxFuture;
use sqlx::{PgConnection, PgPool};

/// Run `body` inside BEGIN/COMMIT, rolling back when it returns an error.
///
/// The connection goes back to the pool on every path: commit, rollback, or
/// the transaction guard being dropped if the future is cancelled. The body
/// receives a plain `&mut PgConnection`, so accessors do not care whether
/// they run in a transaction or on a pooled connection.
pub async fn run<T, E, F>(pool: &PgPool, body: F) -> Result<T, E>
where
    F: for<'c> FnOnce(&'c mut PgConnection) -> BoxFuture<'c, Result<T, E>>,
    E: From<sqlx::Error>,
{
    let mut tx = pool.begin().await?;

    match body(&mut *tx).await {
        Ok(value) => {
            tx.commit().await?;
            Ok(value)
        }
        Err(err) => {
            if let Err(rollback_err) = tx.rollback().await {
                tracing::warn!(error = %rollback_err, "rollback failed");
            }
            Err(err)
        }
    }
}
