//! Object storage for photos and the generated site.
//!
//! Photos live under [`PHOTO_PREFIX`] in the destination bucket with their
//! caption attached as object metadata. The updater reads them back from the
//! same bucket to render the gallery.

pub mod memory;
pub mod s3;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use s3::S3ObjectStore;

/// Key prefix of uploaded photos.
pub const PHOTO_PREFIX: &str = "photos/";

/// Metadata field holding a photo's caption.
pub const CAPTION_METADATA_KEY: &str = "caption";

/// Storage key of a photo whose source object key is `source_key`.
pub fn photo_key(source_key: &str) -> String {
    format!("{}{}", PHOTO_PREFIX, source_key)
}

/// An object to write. Objects are always publicly readable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub body: Vec<u8>,
    pub content_type: String,
    pub caption: Option<String>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {key}: {message}")]
    Write { key: String, message: String },

    #[error("failed to list objects under {prefix}: {message}")]
    List { prefix: String, message: String },

    #[error("failed to read metadata of {key}: {message}")]
    Head { key: String, message: String },
}

/// A single bucket of an object store.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Write `object`, replacing any object with the same key.
    async fn put(&self, object: StoredObject) -> Result<(), StoreError>;

    /// Keys of every object whose key starts with `prefix`.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, StoreError>;

    /// Caption metadata of the object at `key`, if it has one.
    async fn caption(&self, key: &str) -> Result<Option<String>, StoreError>;
}
