//! Product image storage on the local filesystem.
//!
//! Files land in the configured upload directory under a generated name
//! `<position>-<uuid>-<stem>.<ext>`; the storefront serves that directory,
//! so the returned URL is `<url_prefix>/<file name>`.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::config::UploadConfig;

/// Position used when the form does not give one for an image.
pub const DEFAULT_POSITION: &str = "side";

const MAX_STEM_LEN: usize = 48;

/// Errors that can occur while storing an upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),

    #[error("empty file: {0}")]
    Empty(String),

    #[error("no images in request")]
    NoFiles,

    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

impl UploadError {
    /// Whether the request itself was at fault.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(self, Self::Io(_))
    }
}

/// A stored image as returned to the back office.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StoredImage {
    pub url: String,
    pub position: String,
}

/// Writes uploaded images to the upload directory.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
    url_prefix: String,
}

impl ImageStore {
    #[must_use]
    pub fn new(config: &UploadConfig) -> Self {
        Self {
            dir: config.dir.clone(),
            url_prefix: config.url_prefix.clone(),
        }
    }

    /// Store one image and return its public URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadError::UnsupportedType` unless `content_type` is an
    /// image format browsers display, `UploadError::Empty` for a zero-byte
    /// file, and `UploadError::Io` if the write fails.
    pub async fn store(
        &self,
        original_name: &str,
        content_type: &str,
        position: &str,
        bytes: &[u8],
    ) -> Result<StoredImage, UploadError> {
        let ext = ext_from_mime(content_type)
            .ok_or_else(|| UploadError::UnsupportedType(content_type.to_string()))?;
        if bytes.is_empty() {
            return Err(UploadError::Empty(original_name.to_string()));
        }

        let position = sanitize_position(position);
        let file_name = format!(
            "{position}-{}-{}.{ext}",
            Uuid::new_v4().simple(),
            sanitize_stem(original_name)
        );

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&file_name), bytes).await?;

        tracing::info!(file = %file_name, size = bytes.len(), "Image stored");
        Ok(StoredImage {
            url: format!("{}/{file_name}", self.url_prefix),
            position,
        })
    }
}

fn ext_from_mime(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/webp" => Some("webp"),
        "image/gif" => Some("gif"),
        "image/avif" => Some("avif"),
        _ => None,
    }
}

/// Lowercased file stem with whitespace turned into `-` and anything outside
/// `[a-z0-9-_]` dropped.
fn sanitize_stem(original_name: &str) -> String {
    let base = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);

    let cleaned: String = stem
        .trim()
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            c if c.is_whitespace() => Some('-'),
            'a'..='z' | '0'..='9' | '-' | '_' => Some(c),
            _ => None,
        })
        .take(MAX_STEM_LEN)
        .collect();

    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned
    }
}

fn sanitize_position(position: &str) -> String {
    let cleaned: String = position
        .trim()
        .to_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    if cleaned.is_empty() {
        DEFAULT_POSITION.to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn store_in(dir: PathBuf) -> ImageStore {
        ImageStore {
            dir,
            url_prefix: "/uploads".to_string(),
        }
    }

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("Robe Rouge Été.JPG"), "robe-rouge-t");
        assert_eq!(sanitize_stem("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_stem("C:\\photos\\kaftan_01.png"), "kaftan_01");
        assert_eq!(sanitize_stem("???.png"), "image");
        assert_eq!(sanitize_stem(&"a".repeat(100)).len(), MAX_STEM_LEN);
    }

    #[test]
    fn test_sanitize_position() {
        assert_eq!(sanitize_position("Front"), "front");
        assert_eq!(sanitize_position(""), DEFAULT_POSITION);
        assert_eq!(sanitize_position("../back"), "back");
    }

    #[test]
    fn test_client_errors() {
        assert!(UploadError::UnsupportedType("text/plain".into()).is_client_error());
        assert!(UploadError::NoFiles.is_client_error());
        assert!(!UploadError::Io(std::io::Error::other("disk full")).is_client_error());
    }

    #[tokio::test]
    async fn test_store_writes_file() {
        let dir = std::env::temp_dir().join(format!("dk-upload-{}", Uuid::new_v4()));
        let store = store_in(dir.clone());

        let stored = store
            .store("Kaftan Bleu.png", "image/png", "front", b"\x89PNG")
            .await
            .unwrap();

        assert!(stored.url.starts_with("/uploads/front-"));
        assert!(stored.url.ends_with("-kaftan-bleu.png"));
        assert_eq!(stored.position, "front");

        let file_name = stored.url.trim_start_matches("/uploads/");
        let written = tokio::fs::read(dir.join(file_name)).await.unwrap();
        assert_eq!(written, b"\x89PNG");

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_rejects_non_images() {
        let store = store_in(std::env::temp_dir().join("dk-upload-never-created"));

        let err = store
            .store("notes.txt", "text/plain", "side", b"hello")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType(_)));

        let err = store.store("a.png", "image/png", "side", b"").await.unwrap_err();
        assert!(matches!(err, UploadError::Empty(_)));
    }
}
