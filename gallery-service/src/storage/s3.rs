//! S3-backed object store.

use async_trait::async_trait;
use aws_sdk_s3::{
    config::Region, error::DisplayErrorContext, primitives::ByteStream, types::ObjectCannedAcl,
    Client,
};
use tracing::{error, info};

use super::{ObjectStore, StoreError, StoredObject, CAPTION_METADATA_KEY};

/// One S3 bucket.
#[derive(Clone)]
pub struct S3ObjectStore {
    client: Client,
    bucket: String,
}

impl S3ObjectStore {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build an S3 client from the environment's credentials for `region`.
    pub async fn client_for_region(region: &str) -> Client {
        let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .load()
            .await;
        Client::new(&config)
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn put(&self, object: StoredObject) -> Result<(), StoreError> {
        let StoredObject {
            key,
            body,
            content_type,
            caption,
        } = object;
        let size_bytes = body.len();

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .content_type(&content_type)
            .acl(ObjectCannedAcl::PublicRead);
        if let Some(caption) = caption {
            request = request.metadata(CAPTION_METADATA_KEY, caption);
        }

        match request.send().await {
            Ok(output) => {
                info!(
                    bucket = %self.bucket,
                    key = %key,
                    content_type = %content_type,
                    size_bytes = size_bytes,
                    etag = ?output.e_tag(),
                    "s3_object_written"
                );
                Ok(())
            }
            Err(e) => {
                let message = DisplayErrorContext(&e).to_string();
                error!(bucket = %self.bucket, key = %key, error = %message, "s3_put_failed");
                Err(StoreError::Write { key, message })
            }
        }
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;

        loop {
            let output = self
                .client
                .list_objects_v2()
                .bucket(&self.bucket)
                .prefix(prefix)
                .set_continuation_token(continuation.take())
                .send()
                .await
                .map_err(|e| StoreError::List {
                    prefix: prefix.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            keys.extend(
                output
                    .contents()
                    .iter()
                    .filter_map(|object| object.key().map(str::to_string)),
            );

            match output.next_continuation_token() {
                Some(token) => continuation = Some(token.to_string()),
                None => break,
            }
        }

        info!(bucket = %self.bucket, prefix = %prefix, object_count = keys.len(), "s3_objects_listed");

        Ok(keys)
    }

    async fn caption(&self, key: &str) -> Result<Option<String>, StoreError> {
        let output = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| StoreError::Head {
                key: key.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;

        Ok(output
            .metadata()
            .and_then(|metadata| metadata.get(CAPTION_METADATA_KEY).cloned()))
    }
}
