//! Gallery updater: regenerates the static photo site from stored photos.
//!
//! ```text
//! photo bucket → collect_entries() → render_manifest() → hugo → site bucket
//! ```

pub mod builder;
pub mod manifest;
pub mod site;

use std::path::PathBuf;

use thiserror::Error;

use crate::storage::StoreError;

pub use builder::{collect_entries, GalleryBuilder, RebuildSummary};
pub use manifest::{render_manifest, GalleryEntry};
pub use site::{HugoGenerator, SiteGenerator};

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("site generation failed: {message}")]
    Generator { message: String },
}
