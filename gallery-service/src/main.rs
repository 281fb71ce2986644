//! Photogallery Uploader - MMS webhook receiver.
//!
//! This binary:
//! - Receives inbound MMS webhooks
//! - Copies every attached photo into the destination bucket
//! - Asks the updater to rebuild the gallery

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use photogallery::media::{HttpMediaFetcher, HttpMediaLocator};
use photogallery::web::{shutdown_signal, uploader_router};
use photogallery::{
    AppState, Config, HttpRebuildTrigger, IngestionPipeline, S3ObjectStore, SenderAuthorizer,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize structured JSON logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().json().flatten_event(true))
        .init();

    info!(version = env!("CARGO_PKG_VERSION"), "uploader_starting");

    // Load configuration
    let config = Config::from_env().context("Invalid configuration")?;
    info!(
        port = config.port,
        destination_bucket = %config.destination_bucket,
        update_api_url = %config.update_api_url,
        allowed_senders = config.allowed_senders.len(),
        aws_region = %config.aws_region,
        outbound_timeout_ms = ?config.outbound_timeout_ms,
        "config_loaded"
    );

    let timeout = config.outbound_timeout();
    let locator = HttpMediaLocator::new(timeout).context("Failed to build media locator")?;
    let fetcher = HttpMediaFetcher::new(timeout).context("Failed to build media fetcher")?;
    let trigger = HttpRebuildTrigger::new(config.update_api_url.clone(), timeout)
        .context("Failed to build rebuild trigger")?;

    let s3 = S3ObjectStore::client_for_region(&config.aws_region).await;
    let store = S3ObjectStore::new(s3, config.destination_bucket.clone());
    info!(bucket = %store.bucket(), "s3_store_created");

    let pipeline = IngestionPipeline::new(
        SenderAuthorizer::new(config.allowed_senders.iter().cloned()),
        Arc::new(locator),
        Arc::new(fetcher),
        Arc::new(store),
        Arc::new(trigger),
    );

    let app = uploader_router(AppState::new(pipeline));

    // Bind to address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    info!(address = %addr, "uploader_listening");

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal("uploader"))
        .await
        .context("Server error")?;

    info!("uploader_shutdown_complete");

    Ok(())
}
