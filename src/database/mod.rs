pub mod accessors;
pub mod manager;
pub mod models;
pub mod transaction;

pub use manager::{DatabaseError, DatabaseManager, DatabaseStatus};

/// SQLSTATE codes translated into client errors by the route handlers
pub mod error_codes {
    pub const UNIQUE_CONSTRAINT_VIOLATION: &str = "23505";
    pub const INVALID_FOREIGN_KEY: &str = "23503";
}
