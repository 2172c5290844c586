//! S3-compatible disk
//!
//! Works against MinIO, Cloudflare R2, Backblaze B2, and AWS S3. Static
//! credentials from the config take precedence; otherwise the ambient
//! credential chain (environment, profile, IMDS) is used.

use async_trait::async_trait;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;

use crate::config::S3Config;
use crate::error::{RenderError, Result};
use crate::storage::Disk;

/// Disk writing into one S3 bucket
pub struct S3Disk {
    client: Client,
    bucket: String,
}

impl S3Disk {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub async fn from_config(config: &S3Config) -> Self {
        let client = match (&config.access_key, &config.secret_key) {
            (Some(access_key), Some(secret_key)) => {
                let credentials =
                    Credentials::new(access_key, secret_key, None, None, "pdfsmith");
                let mut builder = aws_sdk_s3::Config::builder()
                    .behavior_version(BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()))
                    .credentials_provider(credentials)
                    .force_path_style(true);
                if let Some(endpoint) = &config.endpoint {
                    builder = builder.endpoint_url(endpoint);
                }
                Client::from_conf(builder.build())
            }
            _ => {
                let mut loader = aws_config::defaults(BehaviorVersion::latest())
                    .region(Region::new(config.region.clone()));
                if let Some(endpoint) = &config.endpoint {
                    loader = loader.endpoint_url(endpoint);
                }
                let sdk_config = loader.load().await;
                let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
                    .force_path_style(true)
                    .build();
                Client::from_conf(s3_config)
            }
        };

        Self::new(client, config.bucket.clone())
    }
}

#[async_trait]
impl Disk for S3Disk {
    async fn put(&self, path: &str, bytes: &[u8]) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(path.trim_start_matches('/'))
            .body(ByteStream::from(bytes.to_vec()))
            .content_type("application/pdf")
            .send()
            .await
            .map_err(|e| RenderError::Storage(DisplayErrorContext(e).to_string()))?;
        tracing::debug!("Wrote {} bytes to s3://{}/{}", bytes.len(), self.bucket, path);
        Ok(())
    }
}
