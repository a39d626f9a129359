//! Domain models for the storefront.
//!
//! Request bodies, query strings and response shapes live here. Table rows
//! shared with the back office come from `dar_koftan_core`.

pub mod account;
pub mod audience;
pub mod catalog;
pub mod checkout;
pub mod session;
pub mod user;

pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
