//! Subscribers and contact messages.

use axum::{Json, Router, extract::State, routing::get};
use dar_koftan_core::{ContactMessage, SmsSubscriber};
use tracing::instrument;

use crate::db::AudienceRepository;
use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/subscribers", get(subscribers))
        .route("/api/admin/contacts", get(contacts))
}

#[instrument(skip_all)]
pub async fn subscribers(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<SmsSubscriber>>, AppError> {
    Ok(Json(AudienceRepository::new(state.pool()).subscribers().await?))
}

#[instrument(skip_all)]
pub async fn contacts(
    _admin: RequireAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<ContactMessage>>, AppError> {
    Ok(Json(AudienceRepository::new(state.pool()).contacts().await?))
}
