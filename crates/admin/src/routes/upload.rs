//! Multipart image upload.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    routing::post,
};
use serde::Serialize;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::services::upload::DEFAULT_POSITION;
use crate::services::{StoredImage, UploadError};
use crate::state::AppState;

pub fn router(max_bytes: usize) -> Router<AppState> {
    Router::new()
        .route("/api/admin/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_bytes))
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: bool,
    pub images: Vec<StoredImage>,
}

struct PendingImage {
    name: String,
    content_type: String,
    bytes: axum::body::Bytes,
}

/// Store every `images` part, pairing the n-th image with the n-th
/// `positions` part.
#[instrument(skip_all)]
pub async fn upload(
    _admin: RequireAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut files = Vec::new();
    let mut positions = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("images" | "images[]") => {
                let name = field.file_name().unwrap_or("image").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid upload: {e}")))?;
                files.push(PendingImage {
                    name,
                    content_type,
                    bytes,
                });
            }
            Some("positions" | "positions[]") => {
                let position = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Invalid position: {e}")))?;
                positions.push(position);
            }
            _ => {}
        }
    }

    if files.is_empty() {
        return Err(UploadError::NoFiles.into());
    }

    let store = state.images();
    let mut images = Vec::with_capacity(files.len());
    for (index, file) in files.iter().enumerate() {
        let position = positions.get(index).map_or(DEFAULT_POSITION, String::as_str);
        images.push(
            store
                .store(&file.name, &file.content_type, position, &file.bytes)
                .await?,
        );
    }

    tracing::info!(count = images.len(), "Images uploaded");
    Ok(Json(UploadResponse {
        success: true,
        images,
    }))
}
