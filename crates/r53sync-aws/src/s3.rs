//! S3 object store for remotely kept resource definitions

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use r53sync_core::location::S3Location;
use r53sync_core::traits::ObjectStore;
use r53sync_core::{Error, Result};
use tracing::debug;

const STORE: &str = "s3";

/// `ObjectStore` backed by S3
pub struct S3ObjectStore {
    client: Client,
}

impl S3ObjectStore {
    pub fn new(config: &SdkConfig) -> Self {
        Self {
            client: Client::new(config),
        }
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get_object(&self, location: &S3Location) -> Result<Vec<u8>> {
        let output = self
            .client
            .get_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .send()
            .await
            .map_err(|e| Error::provider(STORE, DisplayErrorContext(&e).to_string()))?;

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| Error::provider(STORE, format!("reading {location}: {e}")))?
            .into_bytes()
            .to_vec();

        debug!(%location, bytes = body.len(), "GetObject complete");
        Ok(body)
    }

    async fn put_object(&self, location: &S3Location, body: Vec<u8>) -> Result<()> {
        let bytes = body.len();
        self.client
            .put_object()
            .bucket(&location.bucket)
            .key(&location.key)
            .content_type("application/json")
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| Error::provider(STORE, DisplayErrorContext(&e).to_string()))?;

        debug!(%location, bytes, "PutObject complete");
        Ok(())
    }

    fn store_name(&self) -> &'static str {
        STORE
    }
}
