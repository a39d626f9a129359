//! Stock ledger: starting stock, batch updates and the online sweep.

#![allow(clippy::unwrap_used)]

use dar_koftan_admin::db::StockRepository;
use dar_koftan_integration_tests::{
    admin_client, admin_url, create_product, delete_product, pool, unique,
};
use reqwest::StatusCode;
use serde_json::{Value, json};

fn stocks(product: &Value) -> Vec<Value> {
    product["colorVariants"][0]["stocks"]
        .as_array()
        .unwrap()
        .clone()
}

fn find<'a>(stocks: &'a [Value], size: &str, location: &str) -> &'a Value {
    stocks
        .iter()
        .find(|s| s["size"] == size && s["location"] == location)
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_new_product_starting_stock() {
    let admin = admin_client().await;
    let product = create_product(&admin, &unique("Caftan Nour")).await;

    let stocks = stocks(&product);
    // 2 sizes x (3 shops + online)
    assert_eq!(stocks.len(), 8);
    assert_eq!(find(&stocks, "S", "monastir")["quantity"], 5);
    assert_eq!(find(&stocks, "M", "online")["quantity"], 15);

    delete_product(&admin, product["id"].as_i64().unwrap()).await;
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_batch_skips_online_rows() {
    let admin = admin_client().await;
    let product = create_product(&admin, &unique("Caftan Yasmine")).await;
    let stocks = stocks(&product);
    let shop = find(&stocks, "S", "tunis")["id"].as_i64().unwrap();
    let online = find(&stocks, "S", "online")["id"].as_i64().unwrap();

    let resp = admin
        .put(format!("{}/api/admin/stock/batch", admin_url()))
        .json(&json!({ "updates": { (shop.to_string()): 7, (online.to_string()): 99, "999999999": 3 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    let updated = body["updatedStocks"].as_array().unwrap();
    assert_eq!(updated.len(), 1);
    assert_eq!(updated[0]["quantity"], 7);

    // Only online ids left after filtering
    let resp = admin
        .put(format!("{}/api/admin/stock/batch", admin_url()))
        .json(&json!({ "updates": { (online.to_string()): 1 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = admin
        .put(format!("{}/api/admin/stock/batch", admin_url()))
        .json(&json!({ "updates": { (shop.to_string()): -1 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    delete_product(&admin, product["id"].as_i64().unwrap()).await;
}

async fn stock_quantity(pool: &sqlx::PgPool, id: i64) -> i32 {
    sqlx::query_scalar("SELECT quantity FROM shop.stock WHERE id = $1")
        .bind(i32::try_from(id).unwrap())
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_batch_with_one_negative_changes_nothing() {
    let admin = admin_client().await;
    let pool = pool().await;
    let product = create_product(&admin, &unique("Caftan Rim")).await;
    let stocks = stocks(&product);
    let sfax = find(&stocks, "S", "sfax")["id"].as_i64().unwrap();
    let tunis = find(&stocks, "M", "tunis")["id"].as_i64().unwrap();

    let resp = admin
        .put(format!("{}/api/admin/stock/batch", admin_url()))
        .json(&json!({ "updates": { (sfax.to_string()): 7, (tunis.to_string()): -1 } }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(stock_quantity(&pool, sfax).await, 5);
    assert_eq!(stock_quantity(&pool, tunis).await, 5);

    delete_product(&admin, product["id"].as_i64().unwrap()).await;
}

#[tokio::test]
#[ignore = "Requires running admin server and database"]
async fn test_sweep_recreates_missing_online_row() {
    let admin = admin_client().await;
    let pool = pool().await;
    let product = create_product(&admin, &unique("Caftan Lina")).await;
    let stocks = stocks(&product);
    let monastir = find(&stocks, "M", "monastir")["id"].as_i64().unwrap();
    let online = find(&stocks, "M", "online")["id"].as_i64().unwrap();

    sqlx::query("UPDATE shop.stock SET quantity = 9 WHERE id = $1")
        .bind(i32::try_from(monastir).unwrap())
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("DELETE FROM shop.stock WHERE id = $1")
        .bind(i32::try_from(online).unwrap())
        .execute(&pool)
        .await
        .unwrap();

    let summary = StockRepository::new(&pool).aggregate_online().await.unwrap();
    assert!(summary.created >= 1);

    let quantity: i32 = sqlx::query_scalar(
        "SELECT quantity FROM shop.stock WHERE product_id = $1 AND size = 'M' AND location = 'online'",
    )
    .bind(i32::try_from(product["id"].as_i64().unwrap()).unwrap())
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(quantity, 9 + 5 + 5);

    // A second sweep leaves existing online rows alone, even when they drifted
    let small_online = find(&stocks, "S", "online")["id"].as_i64().unwrap();
    let small_tunis = find(&stocks, "S", "tunis")["id"].as_i64().unwrap();
    sqlx::query("UPDATE shop.stock SET quantity = 100 WHERE id = $1")
        .bind(i32::try_from(small_online).unwrap())
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query("UPDATE shop.stock SET quantity = 2 WHERE id = $1")
        .bind(i32::try_from(small_tunis).unwrap())
        .execute(&pool)
        .await
        .unwrap();

    let resp = admin
        .post(format!("{}/api/admin/stock/aggregate", admin_url()))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["created"], 0);
    assert_eq!(stock_quantity(&pool, small_online).await, 100);

    delete_product(&admin, product["id"].as_i64().unwrap()).await;
}
