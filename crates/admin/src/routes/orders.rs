//! Order listing and status changes.

use std::str::FromStr;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch},
};
use dar_koftan_core::{Order, OrderDetail, OrderId, OrderStatus};
use serde::Deserialize;
use tracing::instrument;

use crate::db::OrderRepository;
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/orders", get(list))
        .route("/api/admin/orders/{id}", patch(set_status))
}

#[derive(Debug, Deserialize)]
pub struct OrderFilter {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    #[serde(default)]
    pub status: String,
}

fn parse_status(raw: &str) -> Result<OrderStatus, AppError> {
    OrderStatus::from_str(raw.trim())
        .map_err(|_| AppError::BadRequest(format!("Invalid order status: {raw}")))
}

#[instrument(skip(state))]
pub async fn list(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<Vec<OrderDetail>>, AppError> {
    let status = filter
        .status
        .as_deref()
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("all"))
        .map(parse_status)
        .transpose()?;

    let orders = OrderRepository::new(state.pool()).list(status).await?;
    Ok(Json(orders))
}

#[instrument(skip(state))]
pub async fn set_status(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<OrderId>,
    JsonBody(body): JsonBody<StatusChange>,
) -> Result<Json<Order>, AppError> {
    let status = parse_status(&body.status)?;
    let order = OrderRepository::new(state.pool()).set_status(id, status).await?;
    Ok(Json(order))
}
