//! Per-entity SQL accessors.
//!
//! Every function takes `&mut PgConnection` first so the caller decides
//! whether it runs on a pooled connection or inside `transaction::run`.
//! Driver errors are returned untouched as `ApiError::Database`; handlers map
//! the SQLSTATEs they care about.

pub mod category;
pub mod ingredient;
pub mod order;
pub mod product;
pub mod session;
pub mod user;
