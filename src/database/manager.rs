use std::time::Duration;

use serde::Serialize;
use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config::DatabaseConfig;

/// Errors from DatabaseManager
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Unexpected value for {setting}: {value}")]
    InvalidSetting { setting: &'static str, value: String },

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Snapshot reported by `GET /status`
#[derive(Debug, Clone, Serialize)]
pub struct DatabaseStatus {
    pub version: String,
    pub max_connections: i32,
    pub opened_connections: i32,
}

/// Pool lifecycle and server introspection for the single application database
pub struct DatabaseManager;

impl DatabaseManager {
    /// Build the shared pool from config and open the first connection
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, DatabaseError> {
        let url = config
            .url
            .as_deref()
            .ok_or(DatabaseError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!(
            max_connections = config.max_connections,
            "Created database pool"
        );
        Ok(pool)
    }

    /// Apply pending migrations in timestamp order
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub async fn status(pool: &PgPool) -> Result<DatabaseStatus, DatabaseError> {
        let version: String = sqlx::query_scalar("SHOW server_version;")
            .fetch_one(pool)
            .await?;

        let max_connections_raw: String = sqlx::query_scalar("SHOW max_connections;")
            .fetch_one(pool)
            .await?;
        let max_connections = max_connections_raw
            .trim()
            .parse::<i32>()
            .map_err(|_| DatabaseError::InvalidSetting {
                setting: "max_connections",
                value: max_connections_raw.clone(),
            })?;

        let opened_connections: i32 = sqlx::query_scalar(
            "SELECT count(*)::int FROM pg_stat_activity WHERE datname = current_database();",
        )
        .fetch_one(pool)
        .await?;

        Ok(DatabaseStatus {
            version,
            max_connections,
            opened_connections,
        })
    }

    /// Close the pool on shutdown
    pub async fn close(pool: &PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_requires_database_url() {
        let config = DatabaseConfig {
            url: None,
            max_connections: 1,
            connection_timeout: 1,
            run_migrations: false,
        };

        let err = DatabaseManager::connect(&config).await.unwrap_err();
        assert!(matches!(err, DatabaseError::ConfigMissing("DATABASE_URL")));
    }
}
