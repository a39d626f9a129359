//! Product route handlers.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use dar_koftan_core::{ColorVariantId, ProductDetail, ProductId, Stock};
use tracing::instrument;

use crate::db::{CatalogRepository, RepositoryError};
use crate::error::AppError;
use crate::models::catalog::{ProductListQuery, StockQuery, SuggestionsQuery};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/products", get(list))
        .route("/api/products/home", get(home))
        .route("/api/products/top-sales", get(top_sales))
        .route("/api/products/promo", get(promo))
        .route("/api/products/latest", get(latest))
        .route("/api/products/suggestions", get(suggestions))
        .route("/api/products/{id}", get(show))
        .route("/api/products/{id}/stock", get(stock))
}

type Products = Result<Json<Vec<ProductDetail>>, AppError>;

#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>, Query(query): Query<ProductListQuery>) -> Products {
    let products = CatalogRepository::new(state.pool()).list(&query.into()).await?;
    Ok(Json(products))
}

#[instrument(skip_all)]
pub async fn home(State(state): State<AppState>) -> Products {
    Ok(Json(CatalogRepository::new(state.pool()).home().await?))
}

#[instrument(skip_all)]
pub async fn top_sales(State(state): State<AppState>) -> Products {
    Ok(Json(CatalogRepository::new(state.pool()).top_sales().await?))
}

#[instrument(skip_all)]
pub async fn promo(State(state): State<AppState>) -> Products {
    Ok(Json(CatalogRepository::new(state.pool()).promo().await?))
}

#[instrument(skip_all)]
pub async fn latest(State(state): State<AppState>) -> Products {
    Ok(Json(CatalogRepository::new(state.pool()).latest().await?))
}

/// Same-category products for the "you may also like" rail.
#[instrument(skip(state))]
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionsQuery>,
) -> Products {
    let category = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing category parameter".to_string()))?;

    let products = CatalogRepository::new(state.pool())
        .suggestions(category, query.exclude)
        .await?;
    Ok(Json(products))
}

/// Product page data. Counts as a view.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<ProductDetail>, AppError> {
    match CatalogRepository::new(state.pool()).view(id).await {
        Ok(product) => Ok(Json(product)),
        Err(RepositoryError::NotFound) => Err(AppError::NotFound("Product not found".to_string())),
        Err(err) => Err(err.into()),
    }
}

/// Stock rows for one size of one color, across locations.
#[instrument(skip(state))]
pub async fn stock(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
    Query(query): Query<StockQuery>,
) -> Result<Json<Vec<Stock>>, AppError> {
    let (Some(size), Some(color_id)) = (
        query.size.as_deref().filter(|s| !s.is_empty()),
        query.color_id,
    ) else {
        return Err(AppError::BadRequest(
            "Size and colorId are required".to_string(),
        ));
    };

    let catalog = CatalogRepository::new(state.pool());
    if catalog.size(size).await?.is_none() {
        return Err(AppError::NotFound(format!("Size '{size}' not found")));
    }

    let rows = catalog
        .stock_for(id, ColorVariantId::new(color_id), size)
        .await?;
    Ok(Json(rows))
}
