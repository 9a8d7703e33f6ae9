//! Writes to presigned object-storage URLs.
//!
//! The URL itself carries the authorization, so no credentials or extra
//! headers are sent beyond `Content-Type`.

use async_trait::async_trait;
use bytes::Bytes;
use pdfdesk_core::{ClientConfig, ClientError, ClientResult, ObjectStore};
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;

use crate::transport_error;

#[derive(Clone, Debug)]
pub struct PresignedStorageClient {
    client: Client,
}

impl PresignedStorageClient {
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        Self::new(config.http_timeout())
    }
}

#[async_trait]
impl ObjectStore for PresignedStorageClient {
    async fn put_object(&self, url: &str, content_type: &str, body: Bytes) -> ClientResult<()> {
        let size = body.len();
        tracing::debug!(size, content_type, "PUT to presigned URL");

        let response = self
            .client
            .put(url)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = status.as_u16(), body = %text, "Storage rejected write");
            return Err(ClientError::Status {
                status: status.as_u16(),
                message: "Upload to storage failed".to_string(),
            });
        }

        Ok(())
    }
}
