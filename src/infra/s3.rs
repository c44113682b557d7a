use anyhow::{Context, Result};
use aws_sdk_s3::config::{Credentials, Region};
use bytes::Bytes;
use tracing::debug;

use crate::services::ObjectStore;

/// Reads AirDNA exports from an S3 bucket.
pub struct S3ObjectStore {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3ObjectStore {
    /// Creates a store for `bucket` from an already loaded AWS configuration.
    pub fn new(config: &aws_config::SdkConfig, bucket: impl Into<String>) -> Self {
        Self {
            client: aws_sdk_s3::Client::new(config),
            bucket: bucket.into(),
        }
    }
}

/// Loads AWS configuration, using static keys when given and the ambient
/// credential chain (env vars, profile, instance role) otherwise.
pub async fn load_aws_config(
    credentials: Option<(&str, &str)>,
    region: Option<&str>,
) -> aws_config::SdkConfig {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
    if let Some((access_key_id, secret_access_key)) = credentials {
        loader = loader.credentials_provider(Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "airdna-config",
        ));
    }
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}

#[async_trait::async_trait]
impl ObjectStore for S3ObjectStore {
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let resp = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .with_context(|| format!("S3 ListObjectsV2 failed for '{}/{prefix}'", self.bucket))?;

            keys.extend(
                resp.contents()
                    .iter()
                    .filter_map(|obj| obj.key().map(str::to_string)),
            );

            match resp.next_continuation_token() {
                Some(next) if resp.is_truncated().unwrap_or(false) => {
                    debug!(listed = keys.len(), "Fetching next S3 listing page");
                    continuation = Some(next.to_string());
                }
                _ => break,
            }
        }

        Ok(keys)
    }

    async fn get_object(&self, key: &str) -> Result<Bytes> {
        let resp = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("S3 GetObject failed for '{}/{key}'", self.bucket))?;

        let body = resp
            .body
            .collect()
            .await
            .with_context(|| format!("failed to read body of '{key}'"))?;
        Ok(body.into_bytes())
    }
}
