//! Ingestion pipeline - from webhook body to stored photos.
//!
//! For one inbound message the pipeline:
//! 1. Extracts the message from the form body
//! 2. Checks the sender against the allow-list
//! 3. Locates, downloads and stores every attachment, in order
//! 4. Fires the gallery rebuild trigger once all attachments are stored
//!
//! Attachments are processed sequentially. The first failure aborts the
//! request; attachments stored before it stay stored.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::auth::SenderAuthorizer;
use crate::media::{sniff_content_type, FetchError, LocateError, MediaFetcher, MediaLocator};
use crate::message::{extract_message, Attachment, DecodeError, InboundMessage};
use crate::rebuild::RebuildTrigger;
use crate::storage::{photo_key, ObjectStore, StoreError, StoredObject};

pub const REJECTED_MESSAGE: &str = "Sorry, not allowed!";
pub const NO_MEDIA_MESSAGE: &str = "No media found in message.";
pub const SINGLE_UPLOAD_MESSAGE: &str = "Photo uploaded successfully!";

/// Errors that fail an ingestion request.
///
/// Attachment numbers are one-based.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("invalid webhook payload: {0}")]
    Decode(#[from] DecodeError),

    #[error("could not locate attachment {number} of {total}: {source}")]
    Locate {
        number: usize,
        total: usize,
        #[source]
        source: LocateError,
    },

    #[error("could not download attachment {number} of {total}: {source}")]
    Fetch {
        number: usize,
        total: usize,
        #[source]
        source: FetchError,
    },

    #[error("could not store attachment {number} of {total}: {source}")]
    Store {
        number: usize,
        total: usize,
        #[source]
        source: StoreError,
    },
}

/// Business outcome of a request that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    /// Sender is not on the allow-list
    Rejected,
    /// The message carried no attachments
    NoMedia,
    /// Every attachment was stored, under these keys
    Uploaded { keys: Vec<String> },
}

impl IngestOutcome {
    /// Reply text for the sender.
    pub fn message(&self) -> String {
        match self {
            IngestOutcome::Rejected => REJECTED_MESSAGE.to_string(),
            IngestOutcome::NoMedia => NO_MEDIA_MESSAGE.to_string(),
            IngestOutcome::Uploaded { keys } if keys.len() == 1 => {
                SINGLE_UPLOAD_MESSAGE.to_string()
            }
            IngestOutcome::Uploaded { keys } => {
                format!("{} photos uploaded successfully!", keys.len())
            }
        }
    }
}

/// Moves MMS attachments into the destination store.
#[derive(Clone)]
pub struct IngestionPipeline {
    authorizer: SenderAuthorizer,
    locator: Arc<dyn MediaLocator>,
    fetcher: Arc<dyn MediaFetcher>,
    store: Arc<dyn ObjectStore>,
    rebuild: Arc<dyn RebuildTrigger>,
}

impl IngestionPipeline {
    pub fn new(
        authorizer: SenderAuthorizer,
        locator: Arc<dyn MediaLocator>,
        fetcher: Arc<dyn MediaFetcher>,
        store: Arc<dyn ObjectStore>,
        rebuild: Arc<dyn RebuildTrigger>,
    ) -> Self {
        Self {
            authorizer,
            locator,
            fetcher,
            store,
            rebuild,
        }
    }

    /// Ingest one form-urlencoded webhook body.
    pub async fn ingest(&self, body: &[u8]) -> Result<IngestOutcome, IngestError> {
        let message = extract_message(body)?;

        if !self.authorizer.is_allowed(&message.from) {
            warn!(
                from = %message.from,
                num_media = message.num_media,
                "ingest_sender_rejected"
            );
            return Ok(IngestOutcome::Rejected);
        }

        if message.attachments.is_empty() {
            info!(from = %message.from, "ingest_no_media");
            return Ok(IngestOutcome::NoMedia);
        }

        info!(
            from = %message.from,
            num_media = message.num_media,
            "ingest_start"
        );

        let mut keys = Vec::with_capacity(message.attachments.len());
        for attachment in &message.attachments {
            let key = self.store_attachment(&message, attachment).await?;
            keys.push(key);
        }

        info!(
            from = %message.from,
            stored = keys.len(),
            "ingest_complete"
        );

        self.rebuild.fire();

        Ok(IngestOutcome::Uploaded { keys })
    }

    /// Locate, download and store one attachment, returning its storage key.
    async fn store_attachment(
        &self,
        message: &InboundMessage,
        attachment: &Attachment,
    ) -> Result<String, IngestError> {
        let number = attachment.position + 1;
        let total = message.num_media;

        let location = self
            .locator
            .locate(&attachment.url)
            .await
            .map_err(|source| IngestError::Locate {
                number,
                total,
                source,
            })?;

        let body = self
            .fetcher
            .fetch(&location.hostname)
            .await
            .map_err(|source| IngestError::Fetch {
                number,
                total,
                source,
            })?;

        let content_type = sniff_content_type(&body);
        if let Some(declared) = &attachment.content_type {
            if declared != content_type {
                debug!(
                    declared = %declared,
                    sniffed = content_type,
                    "attachment_content_type_mismatch"
                );
            }
        }

        let key = photo_key(&location.key);
        let caption = message.caption_for(attachment.position);

        info!(
            attachment = number,
            total = total,
            key = %key,
            content_type = content_type,
            size_bytes = body.len(),
            caption = %caption,
            "attachment_storing"
        );

        self.store
            .put(StoredObject {
                key: key.clone(),
                body,
                content_type: content_type.to_string(),
                caption: Some(caption),
            })
            .await
            .map_err(|source| IngestError::Store {
                number,
                total,
                source,
            })?;

        Ok(key)
    }
}
