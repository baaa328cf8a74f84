//! Storage module for toy images
//!
//! Images live in MinIO/S3-compatible object storage; the toy row only keeps
//! the public URL returned by [`ImageStore::upload`].

mod minio_client;

pub use minio_client::MinIOClient;

use async_trait::async_trait;

use crate::core::error::AppError;

/// An image received from a form upload
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store the image and return the URL it is served from
    async fn upload(&self, image: ImageUpload) -> Result<String, AppError>;

    /// Remove a previously uploaded image. URLs this store did not issue are ignored.
    async fn delete_by_url(&self, url: &str) -> Result<(), AppError>;
}
