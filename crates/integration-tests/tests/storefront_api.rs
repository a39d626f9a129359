//! Storefront API against running storefront and admin servers.

#![allow(clippy::unwrap_used)]

use dar_koftan_integration_tests::{
    admin_client, client, create_product, delete_product, storefront_url, unique,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

fn url(path: &str) -> String {
    format!("{}{path}", storefront_url())
}

/// A local 8-digit number unlikely to collide between runs.
fn phone() -> String {
    let n = uuid::Uuid::new_v4().as_u128() % 10_000_000;
    format!("9{n:07}")
}

#[tokio::test]
#[ignore = "Requires running storefront server"]
async fn test_health_and_readiness() {
    let client = client();
    for path in ["/health", "/health/ready"] {
        let resp = client.get(url(path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
    }
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_account_lifecycle() {
    let client = client();
    let username = unique("amel");
    let email = format!("{username}@example.tn");

    let resp = client
        .post(url("/api/users/signup"))
        .json(&json!({ "username": username, "email": email, "password": "jasmin-2025" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = client
        .post(url("/api/users/signup"))
        .json(&json!({ "username": username, "email": email, "password": "jasmin-2025" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(url("/api/users/login"))
        .json(&json!({ "email": email, "password": "wrong-password" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = client
        .post(url("/api/users/login"))
        .json(&json!({ "email": email, "password": "jasmin-2025" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let me: Value = client
        .get(url("/api/users/me"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(me["username"], username.as_str());
    assert_eq!(me["fidelityPoints"], 0);

    let resp = client
        .put(url("/api/users/profile"))
        .json(&json!({ "currentPassword": "wrong-password", "newPassword": "jasmin-2026" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client.post(url("/api/users/logout")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = client.get(url("/api/users/me")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_forgot_password_does_not_reveal_accounts() {
    let resp: Value = client()
        .post(url("/api/users/forgot-password"))
        .json(&json!({ "email": format!("{}@example.tn", unique("nobody")) }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(
        resp["message"],
        "If an account with that email exists, we have sent a password reset link"
    );

    let resp = client()
        .post(url("/api/users/verify-reset-token"))
        .json(&json!({ "token": "00".repeat(32) }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
#[ignore = "Requires running storefront and admin servers and database"]
async fn test_guest_checkout() {
    let admin = admin_client().await;
    let product = create_product(&admin, &unique("Caftan Salma")).await;
    let product_id = product["id"].as_i64().unwrap();

    let order = json!({
        "customerName": "Salma Ben Ali",
        "phoneNumber": phone(),
        "address": "12 rue de Carthage, Sousse",
        "totalAmount": 579,
        "items": [
            { "productId": product_id, "quantity": 2, "price": 289.5, "size": "M", "color": "Bordeaux" }
        ]
    });

    let resp = client().post(url("/api/orders")).json(&order).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "PENDING");
    assert_eq!(body["items"][0]["productName"], product["name"]);

    let mut unknown_color = order.clone();
    unknown_color["items"][0]["color"] = json!("Vert");
    let resp = client()
        .post(url("/api/orders"))
        .json(&unknown_color)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    delete_product(&admin, product_id).await;
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_subscribe_twice() {
    let client = client();
    let number = phone();

    let first: Value = client
        .post(url("/api/subscribe"))
        .json(&json!({ "phoneNumber": number }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(first["success"], true);

    let second: Value = client
        .post(url("/api/subscribe"))
        .json(&json!({ "phoneNumber": format!("+216 {number}") }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(second["message"], "Vous êtes déjà inscrit à nos mises à jour par SMS!");
}

#[tokio::test]
#[ignore = "Requires running storefront server and database"]
async fn test_contact_form() {
    let client = client();

    let resp = client
        .post(url("/api/contact"))
        .json(&json!({ "message": "Bonjour, avez-vous la taille 12ans ?" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = client
        .post(url("/api/contact"))
        .json(&json!({
            "name": "Ines",
            "email": "ines@example.tn",
            "message": "Bonjour, avez-vous la taille 12ans ?"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["contact"]["email"], "ines@example.tn");
}
