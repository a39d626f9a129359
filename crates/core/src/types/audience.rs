//! Rows collected from visitors: SMS subscribers, restock requests and
//! contact messages.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::id::{ContactMessageId, ProductId, SmsSubscriberId, StockNotificationId, UserId};

/// Source recorded when a subscriber signs up from the footer form.
pub const SOURCE_WEBSITE_FOOTER: &str = "website_footer";
/// Source recorded when a subscriber is created by a restock request.
pub const SOURCE_STOCK_NOTIFICATION: &str = "stock_notification";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct SmsSubscriber {
    pub id: SmsSubscriberId,
    pub phone_number: String,
    pub name: String,
    pub source: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A visitor asking to be told when a size/color is back in stock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct StockNotification {
    pub id: StockNotificationId,
    pub phone_number: String,
    pub product_id: ProductId,
    pub product_name: String,
    pub size: String,
    pub color: String,
    pub is_notified: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ContactMessage {
    pub id: ContactMessageId,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub message: String,
    pub user_id: Option<UserId>,
    pub created_at: DateTime<Utc>,
}
