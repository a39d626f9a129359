//! Dar Koftan back office.
//!
//! A JSON API behind a single shared password: product and category
//! management, the stock ledger with its online aggregation sweep, order
//! status changes, image uploads and the dashboard figures. It shares the
//! `shop` schema with the storefront.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// The admin application with tracing and request-id layers applied.
///
/// Sentry layers are added by the binary, outside this router.
pub fn app(state: AppState) -> Router {
    let max_upload_bytes = state.config().upload.max_bytes;

    routes::routes(max_upload_bytes)
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use chrono::Utc;
    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;
    use tower::ServiceExt;

    use super::*;
    use crate::config::{AdminConfig, GateConfig, UploadConfig};
    use crate::middleware::gate::issue_token;

    const COOKIE_SECRET: &str = "q8Zr2LmX9vTb4NcW7yHd1KpF6sJg3QeA";

    fn test_app() -> Router {
        let config = AdminConfig {
            database_url: SecretString::from("postgres://localhost/dar_koftan_test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3001,
            base_url: "http://localhost:3001".to_string(),
            gate: GateConfig {
                password: SecretString::from("Koftan-2025"),
                cookie_secret: SecretString::from(COOKIE_SECRET),
            },
            upload: UploadConfig {
                dir: PathBuf::from("uploads"),
                url_prefix: "/uploads".to_string(),
                max_bytes: 1024,
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 1.0,
        };
        // Lazy pool: nothing here reaches the database.
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/dar_koftan_test")
            .unwrap();
        app(AppState::new(config, pool))
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_admin_routes_require_gate_cookie() {
        for (method, uri) in [
            ("GET", "/api/admin/products"),
            ("GET", "/api/admin/stock"),
            ("PUT", "/api/admin/stock/batch"),
            ("POST", "/api/admin/stock/aggregate"),
            ("GET", "/api/admin/orders"),
            ("GET", "/api/admin/dashboard"),
            ("POST", "/api/admin/logout"),
        ] {
            let response = test_app()
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri(uri)
                        .header(header::CONTENT_TYPE, "application/json")
                        .body(Body::from("{}"))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
        }
    }

    #[tokio::test]
    async fn test_forged_cookie_is_rejected() {
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/admin/dashboard")
                    .header(header::COOKIE, "admin-auth=Koftan-2025")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_valid_cookie_passes_gate() {
        let token = issue_token(&SecretString::from(COOKIE_SECRET), Utc::now()).unwrap();
        // Past the gate, the order filter is validated before any query runs.
        let response = test_app()
            .oneshot(
                Request::builder()
                    .uri("/api/admin/orders?status=LOST")
                    .header(header::COOKIE, format!("admin-auth={token}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_batch_gets_json_error() {
        let token = issue_token(&SecretString::from(COOKIE_SECRET), Utc::now()).unwrap();
        for body in ["{}", r#"{"updates":{"1":2.5}}"#, r#"{"updates":{"abc":1}}"#, "not json"] {
            let response = test_app()
                .oneshot(
                    Request::builder()
                        .method("PUT")
                        .uri("/api/admin/stock/batch")
                        .header(header::CONTENT_TYPE, "application/json")
                        .header(header::COOKIE, format!("admin-auth={token}"))
                        .body(Body::from(body))
                        .unwrap(),
                )
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
            assert_eq!(
                response.headers()[header::CONTENT_TYPE],
                "application/json",
                "{body}"
            );

            let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
            assert!(json["error"].is_string(), "{body}");
        }
    }

    #[tokio::test]
    async fn test_login_sets_readable_cookie() {
        let response = test_app()
            .oneshot(post_json("/api/admin/login", r#"{"password":"Koftan-2025"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(cookie.starts_with("admin-auth="));
        assert!(!cookie.contains("HttpOnly"));
        assert!(cookie.contains("Max-Age=86400"));
    }

    #[tokio::test]
    async fn test_login_wrong_password_keeps_answering_401() {
        for attempt in ["koftan-2025", "KOFTAN-2025", "", "Koftan-2025!"] {
            let response = test_app()
                .oneshot(post_json(
                    "/api/admin/login",
                    &serde_json::json!({ "password": attempt }).to_string(),
                ))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
            assert!(!response.headers().contains_key(header::SET_COOKIE));

            let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["error"], "Invalid password");
        }
    }
}
