use std::{collections::HashMap, time::Duration};

use async_trait::async_trait;
use aws_sdk_s3 as s3;
use aws_sdk_s3::{presigning::PresigningConfig, primitives::ByteStream};
use bytes::Bytes;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    config::S3Config,
    error::{AppError, Result},
};

/// Object storage for product images.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Creates the bucket; an existing bucket owned by us is not an error.
    async fn create_bucket(&self, bucket: &str) -> Result<()>;

    /// Stores the bytes and returns the object key.
    async fn store(
        &self,
        code: &str,
        bytes: Bytes,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<String>;

    /// Resolves a URL clients can fetch the object from.
    async fn object_url(&self, key: &str) -> Result<String>;
}

pub fn object_key(code: &str, filename: &str, content_type: Option<&str>) -> String {
    let from_name = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()));

    let extension = from_name.unwrap_or_else(|| {
        match content_type.unwrap_or_default() {
            "image/jpeg" | "image/jpg" => "jpg",
            "image/png" => "png",
            "image/webp" => "webp",
            "image/gif" => "gif",
            _ => "bin",
        }
        .to_string()
    });

    format!("products/{}/{}.{}", code, Uuid::new_v4(), extension)
}

pub struct S3FileStorage {
    client: s3::Client,
    bucket: String,
    assets_url: Option<String>,
    url_expiry: Duration,
}

impl S3FileStorage {
    pub fn new(client: s3::Client, config: &S3Config) -> Self {
        Self {
            client,
            bucket: config.bucket.clone(),
            assets_url: config
                .assets_url
                .as_ref()
                .map(|url| url.trim_end_matches('/').to_string()),
            url_expiry: config.url_expiry,
        }
    }
}

#[async_trait]
impl FileStorage for S3FileStorage {
    async fn create_bucket(&self, bucket: &str) -> Result<()> {
        match self.client.create_bucket().bucket(bucket).send().await {
            Ok(_) => {
                tracing::info!(bucket, "Created bucket");
                Ok(())
            }
            Err(e) => {
                let already_ours = e
                    .as_service_error()
                    .map(|se| se.is_bucket_already_owned_by_you())
                    .unwrap_or(false);
                if already_ours {
                    tracing::debug!(bucket, "Bucket already exists");
                    Ok(())
                } else {
                    Err(AppError::Storage(format!(
                        "Failed to create bucket {}: {}",
                        bucket,
                        s3::Error::from(e)
                    )))
                }
            }
        }
    }

    async fn store(
        &self,
        code: &str,
        bytes: Bytes,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<String> {
        let key = object_key(code, filename, content_type);
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .set_content_type(content_type.map(str::to_string))
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                AppError::Storage(format!("Failed to upload {}: {}", key, s3::Error::from(e)))
            })?;

        tracing::info!(bucket = %self.bucket, key = %key, size, "Stored product image");

        Ok(key)
    }

    async fn object_url(&self, key: &str) -> Result<String> {
        if let Some(assets_url) = &self.assets_url {
            return Ok(format!("{}/{}", assets_url, key));
        }

        let expires_in = PresigningConfig::expires_in(self.url_expiry)
            .map_err(|e| AppError::Storage(format!("Invalid presigning expiry: {}", e)))?;

        let presigned_request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(expires_in)
            .await
            .map_err(|e| {
                AppError::Storage(format!(
                    "Failed to presign URL for {}: {}",
                    key,
                    s3::Error::from(e)
                ))
            })?;

        Ok(presigned_request.uri().into())
    }
}

/// Keeps objects in process memory.
pub struct InMemoryFileStorage {
    bucket: String,
    objects: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryFileStorage {
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Bytes> {
        self.objects.read().await.get(key).cloned()
    }
}

#[async_trait]
impl FileStorage for InMemoryFileStorage {
    async fn create_bucket(&self, _bucket: &str) -> Result<()> {
        Ok(())
    }

    async fn store(
        &self,
        code: &str,
        bytes: Bytes,
        filename: &str,
        content_type: Option<&str>,
    ) -> Result<String> {
        let key = object_key(code, filename, content_type);
        self.objects.write().await.insert(key.clone(), bytes);
        Ok(key)
    }

    async fn object_url(&self, key: &str) -> Result<String> {
        Ok(format!("memory://{}/{}", self.bucket, key))
    }
}
