//! Request body extractors.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` that rejects malformed bodies with a 400 `{error}` response.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
