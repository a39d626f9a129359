//! User repository for database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use dar_koftan_core::{Email, UserId};

use super::RepositoryError;
use crate::models::user::User;

#[derive(sqlx::FromRow)]
struct UserRow {
    id: UserId,
    username: String,
    email: String,
    password_hash: String,
    is_subscribed: bool,
    fidelity_points: i32,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> Result<(User, String), RepositoryError> {
        let email = Email::parse(&self.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid email in database: {e}"))
        })?;

        Ok((
            User {
                id: self.id,
                username: self.username,
                email,
                is_subscribed: self.is_subscribed,
                fidelity_points: self.fidelity_points,
                created_at: self.created_at,
                updated_at: self.updated_at,
            },
            self.password_hash,
        ))
    }
}

/// Changes applied by a profile update.
#[derive(Debug, Clone)]
pub struct ProfileChanges<'a> {
    pub username: &'a str,
    pub email: &'a Email,
    pub password_hash: Option<&'a str>,
}

/// Repository for user database operations.
pub struct UserRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Get a user by their ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM shop.app_user WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?;

        row.map(|r| r.into_user().map(|(user, _)| user)).transpose()
    }

    /// Get a user by their email address.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the email in the database is invalid.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self.get_with_hash(email).await?.map(|(user, _)| user))
    }

    /// Get a user and their password hash by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_with_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>("SELECT * FROM shop.app_user WHERE email = $1")
            .bind(email.as_str())
            .fetch_optional(self.pool)
            .await?;

        row.map(UserRow::into_user).transpose()
    }

    /// A user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn password_hash(&self, id: UserId) -> Result<String, RepositoryError> {
        sqlx::query_scalar("SELECT password_hash FROM shop.app_user WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool)
            .await?
            .ok_or(RepositoryError::NotFound)
    }

    /// Create a new user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username or email already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &str,
        email: &Email,
        password_hash: &str,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            INSERT INTO shop.app_user (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING *
            ",
        )
        .bind(username)
        .bind(email.as_str())
        .bind(password_hash)
        .fetch_one(self.pool)
        .await?;

        let (user, _) = row.into_user()?;
        Ok(user)
    }

    /// Update username, email and optionally the password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if the new username or email is taken.
    pub async fn update_profile(
        &self,
        id: UserId,
        changes: &ProfileChanges<'_>,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            r"
            UPDATE shop.app_user
            SET username = $2,
                email = $3,
                password_hash = COALESCE($4, password_hash)
            WHERE id = $1
            RETURNING *
            ",
        )
        .bind(id)
        .bind(changes.username)
        .bind(changes.email.as_str())
        .bind(changes.password_hash)
        .fetch_optional(self.pool)
        .await?
        .ok_or(RepositoryError::NotFound)?;

        let (user, _) = row.into_user()?;
        Ok(user)
    }

    /// Replace a user's password hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_password_hash(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.app_user SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }
}
