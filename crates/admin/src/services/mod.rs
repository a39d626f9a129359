//! Services for admin.
//!
//! - `upload` - product image storage

pub mod upload;

pub use upload::{ImageStore, StoredImage, UploadError};
