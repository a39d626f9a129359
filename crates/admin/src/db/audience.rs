//! Read-only views over what visitors left behind.

use dar_koftan_core::{ContactMessage, SmsSubscriber};
use sqlx::PgPool;

use super::RepositoryError;

/// Repository for SMS subscribers and contact messages.
pub struct AudienceRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> AudienceRepository<'a> {
    /// Create a new audience repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Every SMS subscriber, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn subscribers(&self) -> Result<Vec<SmsSubscriber>, RepositoryError> {
        let rows = sqlx::query_as::<_, SmsSubscriber>(
            "SELECT * FROM shop.sms_subscriber ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }

    /// Every contact message, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn contacts(&self) -> Result<Vec<ContactMessage>, RepositoryError> {
        let rows = sqlx::query_as::<_, ContactMessage>(
            "SELECT * FROM shop.contact_message ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.pool)
        .await?;
        Ok(rows)
    }
}
