//! Categories and sizes.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use dar_koftan_core::{SIZE_GROUPS, Size, SizeGroup};
use serde_json::{Value, json};
use tracing::instrument;

use crate::db::CatalogRepository;
use crate::error::AppError;
use crate::models::catalog::SizeQuery;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/categories", get(categories))
        .route("/api/sizes", get(size))
        .route("/api/sizes/groups", get(size_groups))
}

/// `{categories: [...]}` with product counts.
#[instrument(skip_all)]
pub async fn categories(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let categories = state.cache().categories(state.pool()).await?;
    Ok(Json(json!({ "categories": *categories })))
}

#[instrument(skip(state))]
pub async fn size(
    State(state): State<AppState>,
    Query(query): Query<SizeQuery>,
) -> Result<Json<Size>, AppError> {
    let value = query
        .value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest("Size value is required".to_string()))?;

    CatalogRepository::new(state.pool())
        .size(value)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Size with value '{value}' not found")))
}

pub async fn size_groups() -> Json<&'static [SizeGroup]> {
    Json(&SIZE_GROUPS)
}
