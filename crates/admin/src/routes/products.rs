//! Product CRUD for the back office.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
};
use dar_koftan_core::{Product, ProductDetail, ProductId};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::models::{DisplayUpdate, ProductInput};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/products", get(list).post(create))
        .route(
            "/api/admin/products/{id}",
            get(show).put(update).delete(destroy),
        )
        .route("/api/admin/products/{id}/display", patch(update_display))
}

fn validated(input: ProductInput) -> Result<ProductInput, AppError> {
    let input = input.normalized();
    input.validate().map_err(AppError::BadRequest)?;
    Ok(input)
}

#[instrument(skip_all)]
pub async fn list(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ProductDetail>>, AppError> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    Ok(Json(products))
}

#[instrument(skip(state, input))]
pub async fn create(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    JsonBody(input): JsonBody<ProductInput>,
) -> Result<(StatusCode, Json<ProductDetail>), AppError> {
    let input = validated(input)?;
    let product = ProductRepository::new(state.pool()).create(&input).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state))]
pub async fn show(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>, AppError> {
    let product = ProductRepository::new(state.pool()).get(id).await?;
    Ok(Json(product))
}

#[instrument(skip(state, input))]
pub async fn update(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    JsonBody(input): JsonBody<ProductInput>,
) -> Result<Json<ProductDetail>, AppError> {
    let input = validated(input)?;
    let product = ProductRepository::new(state.pool()).update(id, &input).await?;
    Ok(Json(product))
}

#[instrument(skip(state))]
pub async fn destroy(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Value>, AppError> {
    ProductRepository::new(state.pool()).delete(id).await?;

    tracing::info!(product_id = %id, "Product deleted");
    Ok(Json(json!({ "success": true })))
}

#[instrument(skip(state))]
pub async fn update_display(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    JsonBody(update): JsonBody<DisplayUpdate>,
) -> Result<Json<Product>, AppError> {
    let product = ProductRepository::new(state.pool())
        .update_display(id, &update)
        .await?;
    Ok(Json(product))
}
