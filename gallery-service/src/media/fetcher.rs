//! Media download.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("media download failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("media download from {url} returned status {status}")]
    Status { url: String, status: u16 },
}

/// Downloads the raw bytes of a resolved media file.
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

/// [`MediaFetcher`] reading the whole response body into memory.
#[derive(Clone)]
pub struct HttpMediaFetcher {
    client: Client,
}

impl HttpMediaFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl MediaFetcher for HttpMediaFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self.client.get(url).send().await.map_err(|e| {
            error!(url = %url, error = %e, "media_fetch_request_error");
            FetchError::Request(e)
        })?;

        let status = response.status();
        if !status.is_success() {
            error!(url = %url, status_code = status.as_u16(), "media_fetch_bad_status");
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?;

        info!(
            url = %url,
            status_code = status.as_u16(),
            size_bytes = bytes.len(),
            "media_fetch_complete"
        );

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::serve;
    use axum::{http::StatusCode, routing::get, Router};

    fn media_app() -> Router {
        Router::new()
            .route("/bucket/img.png", get(|| async { b"\x89PNG\r\n\x1a\n0000".to_vec() }))
            .route(
                "/bucket/denied.png",
                get(|| async { (StatusCode::FORBIDDEN, "AccessDenied") }),
            )
    }

    #[tokio::test]
    async fn test_fetch_reads_whole_body() {
        let base = serve(media_app()).await;
        let fetcher = HttpMediaFetcher::new(None).unwrap();

        let bytes = fetcher.fetch(&format!("{base}/bucket/img.png")).await.unwrap();

        assert_eq!(bytes, b"\x89PNG\r\n\x1a\n0000".to_vec());
    }

    #[tokio::test]
    async fn test_fetch_rejects_error_status() {
        let base = serve(media_app()).await;
        let fetcher = HttpMediaFetcher::new(None).unwrap();

        let err = fetcher
            .fetch(&format!("{base}/bucket/denied.png"))
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_fetch_transport_failure() {
        let fetcher = HttpMediaFetcher::new(Some(Duration::from_secs(2))).unwrap();

        let err = fetcher.fetch("http://127.0.0.1:1/img.png").await.unwrap_err();

        assert!(matches!(err, FetchError::Request(_)));
    }
}
