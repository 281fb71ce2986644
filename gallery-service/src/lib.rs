//! Photogallery - MMS photo uploads into a static gallery site.
//!
//! This library provides shared modules for the two binaries:
//! - `photogallery-uploader`: Receives MMS webhooks and stores attached photos
//! - `photogallery-updater`: Regenerates the gallery site from stored photos
//!
//! ## Architecture
//!
//! ```text
//! Webhook → Uploader → photo bucket
//!              └── rebuild trigger → Updater → hugo → site bucket
//! ```

pub mod auth;
pub mod config;
pub mod gallery;
pub mod media;
pub mod message;
pub mod pipeline;
pub mod rebuild;
pub mod storage;
pub mod web;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use auth::SenderAuthorizer;
pub use config::{Config, ConfigError, UpdaterConfig};
pub use message::{extract_message, InboundMessage};
pub use pipeline::{IngestError, IngestOutcome, IngestionPipeline};
pub use rebuild::{HttpRebuildTrigger, RebuildTrigger};
pub use storage::{ObjectStore, S3ObjectStore};
pub use web::{AppState, UpdaterState};
