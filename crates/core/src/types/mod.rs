//! Core types for Dar Koftan.
//!
//! This module provides type-safe wrappers for common domain concepts and
//! the row shapes of the shared `shop` schema.

pub mod audience;
pub mod catalog;
pub mod email;
pub mod id;
pub mod phone;
pub mod price;
pub mod size;
pub mod status;

pub use audience::*;
pub use catalog::*;
pub use email::{Email, EmailError};
pub use id::*;
pub use phone::{PhoneError, PhoneNumber};
pub use price::Price;
pub use size::{SIZE_GROUPS, SizeGroup};
pub use status::*;
