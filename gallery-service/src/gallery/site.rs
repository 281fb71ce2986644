//! Static site generation.

use std::path::Path;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::info;

use super::GalleryError;

/// Builds the static site in a working directory.
#[async_trait]
pub trait SiteGenerator: Send + Sync {
    async fn generate(&self, site_dir: &Path) -> Result<(), GalleryError>;
}

/// Runs `hugo --minify` in the site directory.
#[derive(Debug, Clone)]
pub struct HugoGenerator {
    binary: String,
}

impl HugoGenerator {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

#[async_trait]
impl SiteGenerator for HugoGenerator {
    async fn generate(&self, site_dir: &Path) -> Result<(), GalleryError> {
        info!(binary = %self.binary, site_dir = %site_dir.display(), "site_generator_running");

        let output = Command::new(&self.binary)
            .arg("--minify")
            .current_dir(site_dir)
            .output()
            .await
            .map_err(|e| GalleryError::Generator {
                message: format!("failed to run {}: {}", self.binary, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GalleryError::Generator {
                message: format!("{} exited with {}: {}", self.binary, output.status, stderr.trim()),
            });
        }

        info!(
            binary = %self.binary,
            stdout_length = output.stdout.len(),
            "site_generator_complete"
        );

        Ok(())
    }
}
