use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub session: SessionConfig,
    pub security: SecurityConfig,
    pub validator: ValidatorConfig,
    pub admin: AdminConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    pub expiry_days: i64,
    /// Sessions closer than this to expiring are renewed on `GET /user`
    pub renew_window_days: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cookie_secure: bool,
    pub bcrypt_cost: u32,
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorConfig {
    pub cache_capacity: usize,
}

/// Credentials used by `POST /users/admin` to bootstrap the admin account
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    pub username: Option<String>,
    pub password: Option<String>,
}

impl std::fmt::Debug for AdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminConfig")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .finish()
    }
}

/// Settings that parse but cannot be served
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("SECURITY_CORS_ORIGINS cannot contain \"*\": session cookies require explicit origins")]
    WildcardCorsOrigin,

    #[error("SECURITY_CORS_ORIGINS entry is not a valid origin: {0}")]
    InvalidCorsOrigin(String),
}

impl AppConfig {
    /// Reject settings the server would fail on at runtime
    pub fn validate(&self) -> Result<(), ConfigError> {
        for origin in &self.security.cors_origins {
            if origin == "*" {
                return Err(ConfigError::WildcardCorsOrigin);
            }
            if axum::http::HeaderValue::from_str(origin).is_err() {
                return Err(ConfigError::InvalidCorsOrigin(origin.clone()));
            }
        }
        Ok(())
    }

    /// Preset chosen by `APP_ENV`, then per-setting environment overrides
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let mut config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };
        config.apply_env_overrides();
        config
    }

    fn apply_env_overrides(&mut self) {
        parse_var("PORT", &mut self.server.port);

        if let Ok(url) = env::var("DATABASE_URL") {
            self.database.url = Some(url);
        }
        parse_var("DATABASE_MAX_CONNECTIONS", &mut self.database.max_connections);
        parse_var("DATABASE_CONNECTION_TIMEOUT", &mut self.database.connection_timeout);
        parse_var("DATABASE_RUN_MIGRATIONS", &mut self.database.run_migrations);

        parse_var("SESSION_EXPIRY_DAYS", &mut self.session.expiry_days);
        parse_var("SESSION_RENEW_WINDOW_DAYS", &mut self.session.renew_window_days);

        parse_var("SECURITY_COOKIE_SECURE", &mut self.security.cookie_secure);
        parse_var("SECURITY_BCRYPT_COST", &mut self.security.bcrypt_cost);
        if let Ok(origins) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect();
        }

        parse_var("VALIDATOR_CACHE_CAPACITY", &mut self.validator.cache_capacity);

        self.admin.username = env::var("ADMIN_USERNAME").ok().or(self.admin.username.take());
        self.admin.password = env::var("ADMIN_PASSWORD").ok().or(self.admin.password.take());
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            session: SessionConfig {
                expiry_days: 30,
                renew_window_days: 21,
            },
            security: SecurityConfig {
                cookie_secure: false,
                bcrypt_cost: 4,
                cors_origins: vec!["http://localhost:3000".to_string()],
            },
            validator: ValidatorConfig { cache_capacity: 128 },
            admin: AdminConfig::default(),
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            session: SessionConfig {
                expiry_days: 30,
                renew_window_days: 21,
            },
            security: SecurityConfig {
                cookie_secure: true,
                bcrypt_cost: 10,
                cors_origins: vec!["https://staging.example.com".to_string()],
            },
            validator: ValidatorConfig { cache_capacity: 128 },
            admin: AdminConfig::default(),
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig { port: 3000 },
            database: DatabaseConfig {
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            session: SessionConfig {
                expiry_days: 30,
                renew_window_days: 21,
            },
            security: SecurityConfig {
                cookie_secure: true,
                bcrypt_cost: 12,
                cors_origins: vec!["https://app.example.com".to_string()],
            },
            validator: ValidatorConfig { cache_capacity: 256 },
            admin: AdminConfig::default(),
        }
    }
}

/// Overwrite `target` when `name` is set and parses; malformed values keep the preset
fn parse_var<T: FromStr>(name: &str, target: &mut T) {
    if let Some(value) = env::var(name).ok().and_then(|raw| raw.trim().parse().ok()) {
        *target = value;
    }
}

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Process-wide configuration, read from the environment on first use
pub fn config() -> &'static AppConfig {
    &CONFIG
}
