//! Stock ledger endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post, put},
};
use dar_koftan_core::Stock;
use dar_koftan_core::stock::AggregationSummary;
use serde::Serialize;
use tracing::instrument;

use crate::db::StockRepository;
use crate::db::ProductRepository;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::models::{BatchStockUpdate, ProductStock, StockUpdate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/stock", get(overview).put(update_one))
        .route("/api/admin/stock/batch", put(update_batch))
        .route("/api/admin/stock/aggregate", post(aggregate))
}

#[derive(Debug, Serialize)]
pub struct StockOverview {
    pub success: bool,
    pub products: Vec<ProductStock>,
}

#[derive(Debug, Serialize)]
pub struct StockUpdated {
    pub success: bool,
    pub stock: Stock,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchUpdated {
    pub success: bool,
    pub message: String,
    pub updated_stocks: Vec<Stock>,
}

/// Products with every variant's stock grouped by size.
#[instrument(skip_all)]
pub async fn overview(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<StockOverview>, AppError> {
    let products = ProductRepository::new(state.pool())
        .list_with_stock()
        .await?
        .into_iter()
        .map(ProductStock::from)
        .collect();

    Ok(Json(StockOverview {
        success: true,
        products,
    }))
}

#[instrument(skip(state))]
pub async fn update_one(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<StockUpdate>,
) -> Result<Json<StockUpdated>, AppError> {
    if body.quantity < 0 {
        return Err(AppError::BadRequest("Quantity cannot be negative".to_string()));
    }

    let stock = StockRepository::new(state.pool())
        .set_quantity(body.stock_id, body.quantity)
        .await?;

    tracing::info!(stock_id = %stock.id, quantity = stock.quantity, "Stock updated");
    Ok(Json(StockUpdated {
        success: true,
        stock,
    }))
}

#[instrument(skip_all, fields(requested = body.updates.len()))]
pub async fn update_batch(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    JsonBody(body): JsonBody<BatchStockUpdate>,
) -> Result<Json<BatchUpdated>, AppError> {
    let updated_stocks = StockRepository::new(state.pool())
        .apply_batch(&body.updates)
        .await?;

    Ok(Json(BatchUpdated {
        success: true,
        message: "Stocks updated successfully".to_string(),
        updated_stocks,
    }))
}

/// Create the missing online rows from the physical ones.
#[instrument(skip_all)]
pub async fn aggregate(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<AggregationSummary>, AppError> {
    let summary = StockRepository::new(state.pool()).aggregate_online().await?;
    Ok(Json(summary))
}
