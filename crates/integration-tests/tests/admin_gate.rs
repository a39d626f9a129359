//! Back office password gate against a running admin server.

#![allow(clippy::unwrap_used)]

use dar_koftan_integration_tests::{admin_client, admin_url, client};
use reqwest::StatusCode;
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_wrong_password_is_rejected() {
    let client = client();

    let resp = client
        .post(format!("{}/api/admin/login", admin_url()))
        .json(&json!({ "password": "not-the-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .get(format!("{}/api/admin/dashboard", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server and ADMIN_GATE_PASSWORD"]
async fn test_login_then_logout() {
    let admin = admin_client().await;

    let resp = admin
        .get(format!("{}/api/admin/dashboard", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = admin
        .post(format!("{}/api/admin/logout", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = admin
        .get(format!("{}/api/admin/dashboard", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running admin server"]
async fn test_health_is_public() {
    let resp = client()
        .get(format!("{}/health", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}
