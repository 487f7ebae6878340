//! PostgreSQL persistence using Diesel with `diesel-async` and `bb8`.
//!
//! Row structs and table definitions stay private to this module; only the
//! store, the pool and the migration runner are exported.

mod diesel_review_store;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_review_store::DieselReviewStore;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, OwnedConnection, PoolConfig, PoolError};
