//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::services::{CatalogCache, EmailService, SmsClient, SmsError};

/// Error building the outbound clients.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("sms client: {0}")]
    Sms(#[from] SmsError),
    #[error("smtp relay: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    sms: Option<SmsClient>,
    email: Option<EmailService>,
    cache: CatalogCache,
}

impl AppState {
    /// Create a new application state.
    ///
    /// SMS and email are only wired up when their settings are present.
    ///
    /// # Errors
    ///
    /// Returns an error if a configured SMS or SMTP client cannot be built.
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Result<Self, StateError> {
        let sms = config.sms.clone().map(SmsClient::new).transpose()?;
        let email = config.email.as_ref().map(EmailService::new).transpose()?;

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                sms,
                email,
                cache: CatalogCache::new(),
            }),
        })
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// The SMS gateway client, when configured.
    #[must_use]
    pub fn sms(&self) -> Option<&SmsClient> {
        self.inner.sms.as_ref()
    }

    /// The SMTP mailer, when configured.
    #[must_use]
    pub fn email(&self) -> Option<&EmailService> {
        self.inner.email.as_ref()
    }

    #[must_use]
    pub fn cache(&self) -> &CatalogCache {
        &self.inner.cache
    }
}
