//! SMS subscribers, restock requests and contact messages.

use sqlx::PgPool;

use dar_koftan_core::{ContactMessage, PhoneNumber, SOURCE_STOCK_NOTIFICATION, UserId};

use super::RepositoryError;
use crate::models::audience::{
    NewContactMessage, NewStockNotification, StockNotificationOutcome, SubscribeOutcome,
    UNKNOWN_NAME,
};

/// Repository for the storefront's audience tables.
pub struct AudienceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AudienceRepository<'a> {
    /// Create a new audience repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Subscribe a phone number to SMS updates, reactivating it if it had
    /// unsubscribed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn subscribe(
        &self,
        phone: &PhoneNumber,
        name: &str,
        source: &str,
    ) -> Result<SubscribeOutcome, RepositoryError> {
        let existing: Option<bool> =
            sqlx::query_scalar("SELECT is_active FROM shop.sms_subscriber WHERE phone_number = $1")
                .bind(phone.as_str())
                .fetch_optional(self.pool)
                .await?;

        match existing {
            Some(true) => Ok(SubscribeOutcome::AlreadyActive),
            Some(false) => {
                sqlx::query("UPDATE shop.sms_subscriber SET is_active = TRUE WHERE phone_number = $1")
                    .bind(phone.as_str())
                    .execute(self.pool)
                    .await?;
                Ok(SubscribeOutcome::Reactivated)
            }
            None => {
                // A concurrent signup for the same number wins the race.
                let inserted = sqlx::query(
                    r"
                    INSERT INTO shop.sms_subscriber (phone_number, name, source)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (phone_number) DO NOTHING
                    ",
                )
                .bind(phone.as_str())
                .bind(name)
                .bind(source)
                .execute(self.pool)
                .await?;

                Ok(if inserted.rows_affected() == 0 {
                    SubscribeOutcome::AlreadyActive
                } else {
                    SubscribeOutcome::Created
                })
            }
        }
    }

    /// Record a restock request unless the same one is still pending, and
    /// make sure the number is an SMS subscriber.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn request_stock_notification(
        &self,
        request: &NewStockNotification,
    ) -> Result<StockNotificationOutcome, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let pending: bool = sqlx::query_scalar(
            r"
            SELECT EXISTS (
                SELECT 1 FROM shop.stock_notification
                WHERE phone_number = $1 AND product_id = $2 AND size = $3 AND color = $4
                  AND NOT is_notified
            )
            ",
        )
        .bind(request.phone.as_str())
        .bind(request.product_id)
        .bind(&request.size)
        .bind(&request.color)
        .fetch_one(&mut *tx)
        .await?;

        if pending {
            return Ok(StockNotificationOutcome::AlreadyRegistered);
        }

        sqlx::query(
            r"
            INSERT INTO shop.stock_notification (phone_number, product_id, product_name, size, color)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(request.phone.as_str())
        .bind(request.product_id)
        .bind(&request.product_name)
        .bind(&request.size)
        .bind(&request.color)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r"
            INSERT INTO shop.sms_subscriber (phone_number, name, source)
            VALUES ($1, $2, $3)
            ON CONFLICT (phone_number) DO NOTHING
            ",
        )
        .bind(request.phone.as_str())
        .bind(UNKNOWN_NAME)
        .bind(SOURCE_STOCK_NOTIFICATION)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(StockNotificationOutcome::Registered)
    }

    /// Store a contact form message.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_contact(
        &self,
        contact: &NewContactMessage,
        user_id: Option<UserId>,
    ) -> Result<ContactMessage, RepositoryError> {
        let row = sqlx::query_as::<_, ContactMessage>(
            r"
            INSERT INTO shop.contact_message (name, email, phone, message, user_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            ",
        )
        .bind(contact.name.as_deref())
        .bind(contact.email.as_deref())
        .bind(contact.phone.as_deref())
        .bind(&contact.message)
        .bind(user_id)
        .fetch_one(self.pool)
        .await?;
        Ok(row)
    }
}
