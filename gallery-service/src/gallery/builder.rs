//! Gallery rebuild: stored photos → manifest → static site → site bucket.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{info, warn};

use super::manifest::{render_manifest, GalleryEntry};
use super::site::SiteGenerator;
use super::GalleryError;
use crate::storage::{ObjectStore, StoredObject, PHOTO_PREFIX};

/// Manifest location inside the site directory.
pub const MANIFEST_PATH: &str = "content/_index.md";

/// Generated index inside the site directory.
pub const INDEX_PATH: &str = "public/index.html";

/// Key of the index page in the site bucket.
pub const SITE_INDEX_KEY: &str = "index.html";

/// Result of a completed rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RebuildSummary {
    pub photos: usize,
}

/// Regenerates the gallery site from the photo bucket.
pub struct GalleryBuilder {
    photos: Arc<dyn ObjectStore>,
    site: Arc<dyn ObjectStore>,
    generator: Arc<dyn SiteGenerator>,
    site_dir: PathBuf,
    link_base: String,
    // Rebuilds share the site directory.
    running: Mutex<()>,
}

impl GalleryBuilder {
    pub fn new(
        photos: Arc<dyn ObjectStore>,
        site: Arc<dyn ObjectStore>,
        generator: Arc<dyn SiteGenerator>,
        site_dir: impl Into<PathBuf>,
        link_base: impl Into<String>,
    ) -> Self {
        Self {
            photos,
            site,
            generator,
            site_dir: site_dir.into(),
            link_base: link_base.into(),
            running: Mutex::new(()),
        }
    }

    /// Rebuild the site and publish its index page.
    pub async fn rebuild(&self) -> Result<RebuildSummary, GalleryError> {
        let _running = self.running.lock().await;
        info!(site_dir = %self.site_dir.display(), "gallery_rebuild_start");

        let entries = collect_entries(self.photos.as_ref()).await?;
        let manifest = render_manifest(&entries, &self.link_base);

        self.write_manifest(&manifest).await?;
        self.generator.generate(&self.site_dir).await?;
        self.upload_index().await?;

        info!(photos = entries.len(), "gallery_rebuild_complete");

        Ok(RebuildSummary {
            photos: entries.len(),
        })
    }

    async fn write_manifest(&self, manifest: &str) -> Result<(), GalleryError> {
        let path = self.site_dir.join(MANIFEST_PATH);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| io_error(parent, source))?;
        }
        tokio::fs::write(&path, manifest)
            .await
            .map_err(|source| io_error(&path, source))?;

        info!(path = %path.display(), manifest_length = manifest.len(), "gallery_manifest_written");
        Ok(())
    }

    async fn upload_index(&self) -> Result<(), GalleryError> {
        let path = self.site_dir.join(INDEX_PATH);
        let body = tokio::fs::read(&path)
            .await
            .map_err(|source| io_error(&path, source))?;

        self.site
            .put(StoredObject {
                key: SITE_INDEX_KEY.to_string(),
                body,
                content_type: "text/html".to_string(),
                caption: None,
            })
            .await?;

        info!(key = SITE_INDEX_KEY, "gallery_index_uploaded");
        Ok(())
    }
}

/// Read every stored photo and its caption.
///
/// The bare prefix placeholder and other "directory" keys are skipped; photos
/// without a caption get an empty one.
pub async fn collect_entries(store: &dyn ObjectStore) -> Result<Vec<GalleryEntry>, GalleryError> {
    let keys = store.list_keys(PHOTO_PREFIX).await?;

    let mut entries = Vec::with_capacity(keys.len());
    for key in keys {
        if key.ends_with('/') {
            continue;
        }
        let caption = store.caption(&key).await?.unwrap_or_else(|| {
            warn!(key = %key, "gallery_photo_without_caption");
            String::new()
        });
        entries.push(GalleryEntry { key, caption });
    }

    Ok(entries)
}

fn io_error(path: &Path, source: std::io::Error) -> GalleryError {
    GalleryError::Io {
        path: path.to_path_buf(),
        source,
    }
}
