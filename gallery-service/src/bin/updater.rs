//! Photogallery Updater - gallery site regeneration service.
//!
//! This binary:
//! 1. Lists the photos in the photo bucket with their captions
//! 2. Renders the gallery manifest and runs the site generator
//! 3. Uploads the generated index page to the site bucket

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use photogallery::gallery::{GalleryBuilder, HugoGenerator};
use photogallery::web::{shutdown_signal, updater_router};
use photogallery::{S3ObjectStore, UpdaterConfig, UpdaterState};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!("updater_starting");

    let config = UpdaterConfig::from_env().context("Invalid configuration")?;
    info!(
        port = config.port,
        photo_bucket = %config.photo_bucket,
        site_bucket = %config.site_bucket,
        site_dir = %config.site_dir,
        aws_region = %config.aws_region,
        "config_loaded"
    );

    let s3 = S3ObjectStore::client_for_region(&config.aws_region).await;
    let builder = GalleryBuilder::new(
        Arc::new(S3ObjectStore::new(s3.clone(), config.photo_bucket.clone())),
        Arc::new(S3ObjectStore::new(s3, config.site_bucket.clone())),
        Arc::new(HugoGenerator::new(config.hugo_bin.clone())),
        config.site_dir.clone(),
        config.photo_base_url.clone(),
    );

    let app = updater_router(UpdaterState::new(builder));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "updater_listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal("updater"))
        .await
        .context("Server error")?;

    info!("updater_shutdown_complete");

    Ok(())
}
