//! Database operations for the storefront.
//!
//! The storefront reads the catalog and writes what visitors create:
//!
//! ## Tables
//!
//! - `shop.product`, `shop.color_variant`, `shop.product_image`, `shop.stock` - read, plus view/order counters
//! - `shop.size`, `shop.category` - read
//! - `shop.customer_order`, `shop.order_item` - checkout
//! - `shop.app_user`, `shop.password_reset_token` - accounts
//! - `shop.sms_subscriber`, `shop.stock_notification`, `shop.contact_message` - visitor input
//! - `tower_sessions.session` - session storage
//!
//! # Migrations
//!
//! Migrations are stored in `migrations/` at the workspace root and run via:
//! ```bash
//! cargo run -p dar-koftan-cli -- migrate
//! ```

pub mod audience;
pub mod catalog;
pub mod orders;
pub mod reset_tokens;
pub mod search;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

pub use audience::AudienceRepository;
pub use catalog::CatalogRepository;
pub use orders::OrderRepository;
pub use reset_tokens::ResetTokenRepository;
pub use search::SearchRepository;
pub use users::UserRepository;

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

    /// Constraint violation (e.g., duplicate email).
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
