//! Password reset tokens.
//!
//! A user holds at most one live token: issuing deletes the previous ones,
//! and redeeming deletes them all, so a token works once.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use dar_koftan_core::UserId;

use super::RepositoryError;

/// Repository for reset token operations.
pub struct ResetTokenRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> ResetTokenRepository<'a> {
    /// Create a new reset token repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Replace the user's tokens with `token`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if a query fails.
    pub async fn issue(
        &self,
        user_id: UserId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM shop.password_reset_token WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO shop.password_reset_token (token, user_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// The owner's id and email when `token` exists and has not expired at `now`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn find_valid(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<(UserId, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, (UserId, String)>(
            r"
            SELECT u.id, u.email
            FROM shop.password_reset_token t
            JOIN shop.app_user u ON u.id = t.user_id
            WHERE t.token = $1 AND t.expires_at >= $2
            ",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(self.pool)
        .await?;
        Ok(row)
    }

    /// Set a new password hash with a valid token, then delete every token
    /// of that user. Returns the user's id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the token is unknown or expired.
    pub async fn redeem(
        &self,
        token: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<UserId, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let user_id: UserId = sqlx::query_scalar(
            r"
            SELECT user_id FROM shop.password_reset_token
            WHERE token = $1 AND expires_at >= $2
            FOR UPDATE
            ",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        sqlx::query("UPDATE shop.app_user SET password_hash = $2 WHERE id = $1")
            .bind(user_id)
            .bind(password_hash)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM shop.password_reset_token WHERE user_id = $1")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user_id)
    }
}
