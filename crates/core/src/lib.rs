//! Dar Koftan Core - Shared types library.
//!
//! This crate provides common types used across all Dar Koftan components:
//! - `storefront` - Public JSON API for the shop
//! - `admin` - Password-gated back office API
//! - `cli` - Command-line tools for migrations and stock maintenance
//!
//! # Architecture
//!
//! The core crate contains types and pure functions only - no I/O, no
//! database connections, no HTTP clients. Row types derive `sqlx::FromRow`
//! behind the `postgres` feature so the binaries can query straight into them.
//!
//! # Modules
//!
//! - [`types`] - IDs, prices, emails, phone numbers, statuses and table rows
//! - [`stock`] - Online stock aggregation and batch update policies

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod stock;
pub mod types;

pub use types::*;
