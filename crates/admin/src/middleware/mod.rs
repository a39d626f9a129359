//! HTTP middleware for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request spans)
//! 3. Request ID
//!
//! The admin gate is an extractor rather than a layer so `/health` and
//! `/api/admin/login` stay open.

pub mod gate;
pub mod request_id;

pub use gate::{GATE_COOKIE, RequireAdmin};
pub use request_id::request_id_middleware;
