//! Business logic services for the storefront.
//!
//! - `auth` - password accounts and the reset-token flow
//! - `cache` - short-lived cache of catalog aggregates
//! - `email` - password reset emails (SMTP)
//! - `sms` - order confirmation texts (HTTP gateway)

pub mod auth;
pub mod cache;
pub mod email;
pub mod sms;

pub use auth::{AuthError, AuthService};
pub use cache::CatalogCache;
pub use email::{EmailError, EmailService};
pub use sms::{SmsClient, SmsError};
