//! Integration tests for Dar Koftan.
//!
//! The tests under `tests/` talk to running binaries over HTTP and to the
//! database directly. They are `#[ignore]`d so `cargo test` stays hermetic.
//!
//! # Running Tests
//!
//! ```bash
//! dk-cli migrate && dk-cli seed sizes
//! cargo run -p dar-koftan-storefront &
//! cargo run -p dar-koftan-admin &
//! cargo test -p dar-koftan-integration-tests -- --ignored
//! ```
//!
//! # Environment
//!
//! - `DATABASE_URL` - same database the servers use
//! - `STOREFRONT_BASE_URL` - default `http://localhost:3000`
//! - `ADMIN_BASE_URL` - default `http://localhost:3001`
//! - `ADMIN_GATE_PASSWORD` - the back office password

#![allow(clippy::missing_panics_doc)]

use reqwest::Client;
use secrecy::SecretString;
use sqlx::PgPool;

#[must_use]
pub fn storefront_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

#[must_use]
pub fn admin_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_string())
}

/// A client that keeps cookies between requests.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .build()
        .expect("Failed to create HTTP client")
}

/// A client already past the admin gate.
pub async fn admin_client() -> Client {
    let password =
        std::env::var("ADMIN_GATE_PASSWORD").expect("ADMIN_GATE_PASSWORD must be set");
    let client = client();

    let resp = client
        .post(format!("{}/api/admin/login", admin_url()))
        .json(&serde_json::json!({ "password": password }))
        .send()
        .await
        .expect("Failed to reach admin login");
    assert!(resp.status().is_success(), "admin login failed: {}", resp.status());

    client
}

/// Pool on the shared database.
pub async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    dar_koftan_admin::db::create_pool(&SecretString::from(url))
        .await
        .expect("Failed to connect to database")
}

/// A name no other test run uses.
#[must_use]
pub fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

/// Create a product through the back office with one color and two sizes.
/// Returns the product detail JSON.
pub async fn create_product(admin: &Client, name: &str) -> serde_json::Value {
    let resp = admin
        .post(format!("{}/api/admin/products", admin_url()))
        .json(&serde_json::json!({
            "name": name,
            "description": "Caftan brodé main",
            "price": 289.5,
            "category": "caftans",
            "sizes": ["S", "M"],
            "colorVariants": [
                { "color": "Bordeaux", "images": [{ "url": "/uploads/test.jpg" }] }
            ]
        }))
        .send()
        .await
        .expect("Failed to create product");
    assert_eq!(resp.status(), reqwest::StatusCode::CREATED);
    resp.json().await.expect("product JSON")
}

/// Delete a product created by a test.
pub async fn delete_product(admin: &Client, id: i64) {
    let _ = admin
        .delete(format!("{}/api/admin/products/{id}", admin_url()))
        .send()
        .await;
}
