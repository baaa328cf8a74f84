//! MinIO/S3-compatible storage client for toy images
//!
//! Uses rust-s3 crate for lightweight S3 operations.

use async_trait::async_trait;
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ImageStore, ImageUpload};
use crate::core::config::MinIOConfig;
use crate::core::error::AppError;

/// MinIO/S3-compatible storage client
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    image_prefix: String,
}

impl MinIOClient {
    /// Build the client without touching the network
    pub fn from_config(config: MinIOConfig) -> Result<Self, AppError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| AppError::Storage(format!("Failed to create MinIO credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| AppError::Storage(format!("Failed to create MinIO bucket: {}", e)))?;

        // Use path-style URLs for MinIO (http://endpoint/bucket instead of http://bucket.endpoint)
        bucket.set_path_style();

        Ok(Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            image_prefix: config.image_prefix,
        })
    }

    /// Build the client and make sure its bucket exists
    pub async fn connect(config: MinIOConfig) -> Result<Self, AppError> {
        let client = Self::from_config(config)?;
        client.ensure_bucket_exists().await?;

        info!(
            "MinIO client initialized for endpoint: {}, bucket: {}, image_prefix: {}",
            client.endpoint,
            client.bucket.name(),
            client.image_prefix
        );

        Ok(client)
    }

    /// Ensure the bucket exists, create if not
    pub async fn ensure_bucket_exists(&self) -> Result<(), AppError> {
        match self.create_bucket().await {
            Ok(_) => {
                info!("Bucket '{}' created successfully", self.bucket.name());
                Ok(())
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                } else {
                    warn!(
                        "Could not create bucket '{}': {}. Assuming it exists.",
                        self.bucket.name(),
                        e
                    );
                }
                Ok(())
            }
        }
    }

    async fn create_bucket(&self) -> Result<(), AppError> {
        Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await
        .map_err(|e| {
            AppError::Storage(format!(
                "Failed to create bucket '{}': {}",
                self.bucket.name(),
                e
            ))
        })?;

        Ok(())
    }

    /// Object key for a new image, e.g. `toy_photos/<uuid>.png`
    pub fn image_key(&self, content_type: &str, file_name: &str) -> String {
        let extension = extension_for(content_type)
            .or_else(|| {
                file_name
                    .rsplit_once('.')
                    .map(|(_, ext)| ext)
                    .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            })
            .unwrap_or("bin");

        format!("{}/{}.{}", self.image_prefix, Uuid::new_v4(), extension)
    }

    /// Public URL for an object key
    pub fn get_file_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_endpoint, self.bucket.name(), key)
    }

    /// Extract the object key from a URL issued by this client
    pub fn extract_key_from_url(&self, url: &str) -> Option<String> {
        let bucket = self.bucket.name();

        [&self.public_endpoint, &self.endpoint]
            .iter()
            .find_map(|endpoint| url.strip_prefix(&format!("{}/{}/", endpoint, bucket)))
            .filter(|key| key.starts_with(&format!("{}/", self.image_prefix)))
            .map(|key| key.to_string())
    }

    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), AppError> {
        self.bucket
            .put_object_with_content_type(key, data, content_type)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to upload file '{}': {}", key, e)))?;

        debug!("Uploaded file '{}' to bucket '{}'", key, self.bucket.name());
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        self.bucket
            .delete_object(key)
            .await
            .map_err(|e| AppError::Storage(format!("Failed to delete file '{}': {}", key, e)))?;

        debug!(
            "Deleted file '{}' from bucket '{}'",
            key,
            self.bucket.name()
        );
        Ok(())
    }
}

#[async_trait]
impl ImageStore for MinIOClient {
    async fn upload(&self, image: ImageUpload) -> Result<String, AppError> {
        let key = self.image_key(&image.content_type, &image.file_name);
        self.put(&key, &image.data, &image.content_type).await?;

        info!(
            "Image stored: key={}, original_filename={}, size={}",
            key,
            image.file_name,
            image.data.len()
        );

        Ok(self.get_file_url(&key))
    }

    async fn delete_by_url(&self, url: &str) -> Result<(), AppError> {
        match self.extract_key_from_url(url) {
            Some(key) => self.delete(&key).await,
            None => {
                debug!("Not deleting foreign image URL: {}", url);
                Ok(())
            }
        }
    }
}

/// Get file extension from content type
fn extension_for(content_type: &str) -> Option<&'static str> {
    match content_type {
        "image/jpeg" => Some("jpg"),
        "image/png" => Some("png"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}
