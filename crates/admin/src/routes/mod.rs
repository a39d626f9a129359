//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                          - Liveness
//! GET    /health/ready                    - Database reachable
//!
//! # Gate
//! POST   /api/admin/login                 - Password -> admin-auth cookie
//! POST   /api/admin/logout                - Clear the cookie
//!
//! # Products
//! GET    /api/admin/products              - All products, newest first
//! POST   /api/admin/products              - Create with variants, images, stock
//! GET    /api/admin/products/{id}         - Detail
//! PUT    /api/admin/products/{id}         - Update, variants diffed by color
//! DELETE /api/admin/products/{id}         - Delete
//! PATCH  /api/admin/products/{id}/display - Home/promo/top-sales flags, priority
//!
//! # Stock
//! GET    /api/admin/stock                 - Stock grouped by variant and size
//! PUT    /api/admin/stock                 - One counter
//! PUT    /api/admin/stock/batch           - Many counters, all or nothing
//! POST   /api/admin/stock/aggregate       - Create missing online rows
//!
//! # Orders, categories, uploads
//! GET    /api/admin/orders                - Orders with items (?status=)
//! PATCH  /api/admin/orders/{id}           - Change status
//! GET    /api/admin/categories            - With product counts
//! POST   /api/admin/categories            - Create
//! DELETE /api/admin/categories?name=      - Delete, products -> uncategorized
//! POST   /api/admin/upload                - Multipart images[] + positions[]
//!
//! # Figures
//! GET    /api/admin/dashboard             - Totals and recent orders
//! GET    /api/admin/analytics             - Per status, last 7 days, top products
//! GET    /api/admin/subscribers           - SMS subscribers
//! GET    /api/admin/contacts              - Contact messages
//! ```
//!
//! Everything under `/api/admin` except login takes the
//! [`RequireAdmin`](crate::middleware::RequireAdmin) extractor.

pub mod audience;
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod stock;
pub mod upload;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Build the complete admin router.
pub fn routes(max_upload_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(auth::router())
        .merge(products::router())
        .merge(stock::router())
        .merge(orders::router())
        .merge(categories::router())
        .merge(upload::router(max_upload_bytes))
        .merge(dashboard::router())
        .merge(audience::router())
}

/// Liveness: the process is up.
async fn health() -> &'static str {
    "ok"
}

/// Readiness: 503 unless the database answers.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::SERVICE_UNAVAILABLE,
    }
}
