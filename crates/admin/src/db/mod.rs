//! Database operations for the back office.
//!
//! The admin binary reads and writes the same `shop` schema as the
//! storefront. Row types are shared through `dar_koftan_core`; this module
//! owns the queries.
//!
//! ## Tables written here
//!
//! - `shop.product`, `shop.color_variant`, `shop.product_image` - catalog CRUD
//! - `shop.stock` - ledger edits and the online aggregation sweep
//! - `shop.customer_order` - status transitions
//! - `shop.category` - category list
//!
//! # Migrations
//!
//! Migrations are stored in `migrations/` at the workspace root and run via:
//! ```bash
//! cargo run -p dar-koftan-cli -- migrate
//! ```

pub mod audience;
pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod stock;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use audience::AudienceRepository;
pub use categories::CategoryRepository;
pub use dashboard::DashboardRepository;
pub use orders::OrderRepository;
pub use products::ProductRepository;
pub use stock::StockRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate category name).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict(db_err.constraint().unwrap_or("unique").to_string())
            }
            _ => Self::Database(err),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
