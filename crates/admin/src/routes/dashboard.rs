//! Dashboard figures.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use tracing::instrument;

use crate::db::DashboardRepository;
use crate::db::dashboard::{Analytics, DashboardSummary};
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/dashboard", get(summary))
        .route("/api/admin/analytics", get(analytics))
}

#[instrument(skip_all)]
pub async fn summary(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = DashboardRepository::new(state.pool()).summary().await?;
    Ok(Json(summary))
}

#[instrument(skip_all)]
pub async fn analytics(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Analytics>, AppError> {
    let analytics = DashboardRepository::new(state.pool())
        .analytics(Utc::now().date_naive())
        .await?;
    Ok(Json(analytics))
}
