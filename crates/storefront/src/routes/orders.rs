//! Checkout.

use axum::{Json, Router, extract::State, routing::post};
use dar_koftan_core::OrderDetail;
use tracing::{Instrument, instrument};

use crate::db::OrderRepository;
use crate::error::{AppError, add_breadcrumb};
use crate::extract::JsonBody;
use crate::middleware::OptionalAuth;
use crate::models::checkout::CheckoutRequest;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/orders", post(checkout))
}

/// Place an order. Guests may check out; a signed-in customer gets the
/// order attached to their account.
///
/// The SMS confirmation goes out after the order is committed and never
/// fails the request.
#[instrument(skip_all)]
pub async fn checkout(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    JsonBody(body): JsonBody<CheckoutRequest>,
) -> Result<Json<OrderDetail>, AppError> {
    let order = body.validate()?;

    let detail = OrderRepository::new(state.pool())
        .checkout(&order, user.map(|u| u.id))
        .await?;

    let order_id = detail.order.id.to_string();
    add_breadcrumb("checkout", "Order placed", Some(&[("order_id", &order_id)]));
    tracing::info!(
        order_id = %order_id,
        items = detail.items.len(),
        total = %detail.order.total_amount,
        "Order placed"
    );

    if let Some(sms) = state.sms().cloned() {
        let confirmed = detail.clone();
        tokio::spawn(
            async move {
                if let Err(e) = sms.send_order_confirmation(&confirmed).await {
                    tracing::warn!(error = %e, "Order confirmation SMS failed");
                }
            }
            .in_current_span(),
        );
    }

    Ok(Json(detail))
}
