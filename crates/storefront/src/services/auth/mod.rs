//! Authentication service.
//!
//! Password accounts hashed with Argon2id, profile changes and the
//! reset-token flow.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use sqlx::PgPool;

use dar_koftan_core::{Email, UserId};

use crate::db::users::{ProfileChanges, UserRepository};
use crate::db::{RepositoryError, ResetTokenRepository};
use crate::models::account::{RESET_TOKEN_BYTES, RESET_TOKEN_TTL_MINUTES};
use crate::models::user::User;

/// Minimum password length.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Authentication service.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: ResetTokenRepository<'a>,
}

fn conflict_as_taken(err: RepositoryError) -> AuthError {
    match err {
        RepositoryError::Conflict(_) => AuthError::UserAlreadyExists,
        other => AuthError::Repository(other),
    }
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self {
            users: UserRepository::new(pool),
            tokens: ResetTokenRepository::new(pool),
        }
    }

    /// Register a new user.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidEmail` if the email format is invalid.
    /// Returns `AuthError::WeakPassword` if the password doesn't meet requirements.
    /// Returns `AuthError::UserAlreadyExists` if the username or email is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.users
            .create(username, &email, &password_hash)
            .await
            .map_err(conflict_as_taken)
    }

    /// Login with email and password.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email/password is wrong.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        let email = Email::parse(email).map_err(|_| AuthError::InvalidCredentials)?;

        let (user, password_hash) = self
            .users
            .get_with_hash(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        verify_password(password, &password_hash)?;

        Ok(user)
    }

    /// Get a user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, user_id: UserId) -> Result<User, AuthError> {
        self.users
            .get_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }

    /// Update username and email, and the password when `password_change`
    /// carries the current and new passwords.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CurrentPasswordIncorrect` if the current password is wrong.
    /// Returns `AuthError::UserAlreadyExists` if the username or email is taken.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        username: &str,
        email: &str,
        password_change: Option<(&str, &str)>,
    ) -> Result<User, AuthError> {
        let email = Email::parse(email)?;

        let password_hash = match password_change {
            Some((current, new)) => Some(self.checked_new_hash(user_id, current, new).await?),
            None => None,
        };

        let changes = ProfileChanges {
            username,
            email: &email,
            password_hash: password_hash.as_deref(),
        };

        self.users
            .update_profile(user_id, &changes)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => conflict_as_taken(other),
            })
    }

    /// Replace the password after checking the current one.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::CurrentPasswordIncorrect` if the current password is wrong.
    /// Returns `AuthError::WeakPassword` if the new password is too short.
    pub async fn change_password(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<(), AuthError> {
        let password_hash = self.checked_new_hash(user_id, current, new).await?;
        self.users
            .set_password_hash(user_id, &password_hash)
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => AuthError::UserNotFound,
                other => AuthError::Repository(other),
            })
    }

    async fn checked_new_hash(
        &self,
        user_id: UserId,
        current: &str,
        new: &str,
    ) -> Result<String, AuthError> {
        let stored = self.users.password_hash(user_id).await.map_err(|err| match err {
            RepositoryError::NotFound => AuthError::UserNotFound,
            other => AuthError::Repository(other),
        })?;

        verify_password(current, &stored).map_err(|_| AuthError::CurrentPasswordIncorrect)?;
        validate_password(new)?;
        hash_password(new)
    }

    /// Issue a reset token for the account with this email, replacing any
    /// earlier token. Returns `None` when no account matches, which callers
    /// must not reveal.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the database operation fails.
    pub async fn start_password_reset(
        &self,
        email: &str,
    ) -> Result<Option<(User, String)>, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Ok(None);
        };
        let Some(user) = self.users.get_by_email(&email).await? else {
            return Ok(None);
        };

        let token = generate_reset_token();
        let expires_at = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
        self.tokens.issue(user.id, &token, expires_at).await?;

        Ok(Some((user, token)))
    }

    /// The email of the account a live reset token belongs to.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidResetToken` if the token is unknown or expired.
    pub async fn verify_reset_token(&self, token: &str) -> Result<String, AuthError> {
        self.tokens
            .find_valid(token, Utc::now())
            .await?
            .map(|(_, email)| email)
            .ok_or(AuthError::InvalidResetToken)
    }

    /// Set a new password with a reset token. The token stops working.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::WeakPassword` if the password is too short.
    /// Returns `AuthError::InvalidResetToken` if the token is unknown or expired.
    pub async fn reset_password(&self, token: &str, password: &str) -> Result<UserId, AuthError> {
        validate_password(password)?;
        let password_hash = hash_password(password)?;

        self.tokens
            .redeem(token, &password_hash, Utc::now())
            .await
            .map_err(|err| match err {
                RepositoryError::NotFound => AuthError::InvalidResetToken,
                other => AuthError::Repository(other),
            })
    }
}

/// 32 random bytes, hex-encoded.
fn generate_reset_token() -> String {
    let bytes: [u8; RESET_TOKEN_BYTES] = rand::random();
    hex::encode(bytes)
}

/// Validate password meets requirements.
fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters long"
        )));
    }

    Ok(())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
