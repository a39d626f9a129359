//! Admin gate login and logout.

use axum::{
    Json, Router,
    extract::State,
    http::header::SET_COOKIE,
    response::{AppendHeaders, IntoResponse},
    routing::post,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::RequireAdmin;
use crate::middleware::gate::{check_password, cleared_gate_cookie, gate_cookie, issue_token};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/login", post(login))
        .route("/api/admin/logout", post(logout))
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Exchange the gate password for an `admin-auth` cookie.
#[instrument(skip(state, body))]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let config = state.config();
    if !check_password(&config.gate, &body.password) {
        tracing::warn!("Admin gate login failed");
        return Err(AppError::Unauthorized("Invalid password".to_string()));
    }

    let token = issue_token(&config.gate.cookie_secret, Utc::now())
        .map_err(|e| AppError::Internal(format!("gate token: {e}")))?;
    let secure = config.base_url.starts_with("https://");

    tracing::info!("Admin gate opened");
    Ok((
        AppendHeaders([(SET_COOKIE, gate_cookie(token, secure))]),
        Json(json!({ "success": true })),
    ))
}

#[instrument(skip_all)]
pub async fn logout(_admin: RequireAdmin) -> impl IntoResponse {
    (
        AppendHeaders([(SET_COOKIE, cleared_gate_cookie())]),
        Json(json!({ "success": true })),
    )
}
