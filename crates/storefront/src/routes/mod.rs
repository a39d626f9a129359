//! HTTP route handlers for the storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness
//! GET  /health/ready                    - Database reachable
//!
//! # Catalog
//! GET  /api/products                    - Listing (?category=&sort=&product=)
//! GET  /api/products/home               - Home page selection
//! GET  /api/products/top-sales          - Top sellers
//! GET  /api/products/promo              - Discounted products
//! GET  /api/products/latest             - Newest products
//! GET  /api/products/suggestions        - Same category (?category=&exclude=)
//! GET  /api/products/{id}               - Detail, counts a view
//! GET  /api/products/{id}/stock         - Stock per location (?size=&colorId=)
//! GET  /api/categories                  - Categories with counts
//! GET  /api/sizes                       - One size (?value=)
//! GET  /api/sizes/groups                - Letter and numeric size groups
//! GET  /api/search                      - Filtered search with facets
//! GET  /api/search/suggestions          - Search-as-you-type
//!
//! # Checkout
//! POST /api/orders                      - Place an order [form limiter]
//!
//! # Accounts
//! POST /api/users/signup                - Create account [auth limiter]
//! POST /api/users/login                 - Start session [auth limiter]
//! POST /api/users/logout                - End session
//! GET  /api/users/me                    - Signed-in user
//! GET  /api/users/profile               - Profile
//! PUT  /api/users/profile               - Update profile
//! PUT  /api/users/change-password       - Change password
//! GET  /api/users/orders                - Own orders
//! POST /api/users/forgot-password       - Email a reset link [auth limiter]
//! POST /api/users/verify-reset-token    - Check a reset token
//! POST /api/users/reset-password        - Set a new password [auth limiter]
//!
//! # Audience
//! POST /api/subscribe                   - SMS list [form limiter]
//! POST /api/stock-notification          - Restock alert [form limiter]
//! POST /api/contact                     - Contact form [form limiter]
//!
//! GET  /uploads/*                       - Product images
//! ```

pub mod audience;
pub mod catalog;
pub mod orders;
pub mod products;
pub mod search;
pub mod users;

use axum::{Router, extract::State, http::StatusCode, routing::get};
use tower_http::services::ServeDir;

use crate::middleware::{auth_rate_limiter, form_rate_limiter};
use crate::state::AppState;

/// Routes that write on behalf of anonymous visitors.
fn form_routes() -> Router<AppState> {
    Router::new()
        .merge(orders::router())
        .merge(audience::router())
        .layer(form_rate_limiter())
}

/// Build the complete storefront router.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(products::router())
        .merge(catalog::router())
        .merge(search::router())
        .merge(users::router())
        .merge(users::credential_router().layer(auth_rate_limiter()))
        .merge(form_routes())
        .nest_service("/uploads", ServeDir::new(&state.config().upload_dir))
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
