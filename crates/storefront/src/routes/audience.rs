//! SMS subscriptions, restock requests and the contact form.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use dar_koftan_core::ContactMessage;
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use crate::db::{AudienceRepository, RepositoryError};
use crate::error::AppError;
use crate::extract::JsonBody;
use crate::middleware::OptionalAuth;
use crate::models::audience::{
    ContactRequest, FormError, StockNotificationRequest, SubscribeRequest, UNKNOWN_NAME,
    subscriber_name,
};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/subscribe", post(subscribe))
        .route("/api/stock-notification", post(stock_notification))
        .route("/api/contact", post(contact))
}

/// Rejections for the visitor-facing forms: `{success: false, error}`.
#[derive(Debug)]
pub enum FormRejection {
    Invalid(FormError),
    App(AppError),
}

impl From<FormError> for FormRejection {
    fn from(err: FormError) -> Self {
        Self::Invalid(err)
    }
}

impl From<AppError> for FormRejection {
    fn from(err: AppError) -> Self {
        Self::App(err)
    }
}

impl From<RepositoryError> for FormRejection {
    fn from(err: RepositoryError) -> Self {
        Self::App(err.into())
    }
}

impl IntoResponse for FormRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Invalid(err) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": err.to_string() })),
            )
                .into_response(),
            Self::App(err) => err.into_response(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FormResponse {
    pub success: bool,
    pub message: &'static str,
}

impl FormResponse {
    const fn ok(message: &'static str) -> Json<Self> {
        Json(Self {
            success: true,
            message,
        })
    }
}

#[derive(Debug, Serialize)]
pub struct ContactResponse {
    pub message: &'static str,
    pub contact: ContactMessage,
}

/// Add a phone number to the SMS list.
#[instrument(skip_all)]
pub async fn subscribe(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    JsonBody(body): JsonBody<SubscribeRequest>,
) -> Result<Json<FormResponse>, FormRejection> {
    let phone = body.phone()?;
    let name = user.as_ref().map_or_else(
        || UNKNOWN_NAME.to_owned(),
        |u| subscriber_name(&u.username, &u.email),
    );

    let outcome = AudienceRepository::new(state.pool())
        .subscribe(&phone, &name, body.source())
        .await?;

    tracing::info!(outcome = ?outcome, source = %body.source(), "SMS subscription");
    Ok(FormResponse::ok(outcome.message()))
}

/// Ask to be told when a sold-out size comes back.
#[instrument(skip_all)]
pub async fn stock_notification(
    State(state): State<AppState>,
    JsonBody(body): JsonBody<StockNotificationRequest>,
) -> Result<Json<FormResponse>, FormRejection> {
    let request = body.validate()?;

    let outcome = AudienceRepository::new(state.pool())
        .request_stock_notification(&request)
        .await?;

    tracing::info!(
        product_id = %request.product_id,
        size = %request.size,
        outcome = ?outcome,
        "Stock notification"
    );
    Ok(FormResponse::ok(outcome.message()))
}

/// Store a contact-form message. Signed-in users are identified by their account.
#[instrument(skip_all)]
pub async fn contact(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    JsonBody(body): JsonBody<ContactRequest>,
) -> Result<(StatusCode, Json<ContactResponse>), FormRejection> {
    let account = user.as_ref().map(|u| (u.username.as_str(), &u.email));
    let message = body.validate(account)?;

    let contact = AudienceRepository::new(state.pool())
        .create_contact(&message, user.map(|u| u.id))
        .await?;

    tracing::info!(contact_id = %contact.id, "Contact message received");
    Ok((
        StatusCode::CREATED,
        Json(ContactResponse {
            message: "Message envoyé avec succès",
            contact,
        }),
    ))
}
