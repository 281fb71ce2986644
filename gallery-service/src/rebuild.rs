//! Gallery rebuild trigger.
//!
//! After photos are stored the uploader asks the updater service to regenerate
//! the gallery. The webhook has already been answered by then, so the request
//! runs on a detached task and its outcome only reaches the logs.

use std::time::Duration;

use reqwest::Client;
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum RebuildError {
    #[error("rebuild request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("rebuild endpoint returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Fire-and-forget request for a gallery rebuild.
pub trait RebuildTrigger: Send + Sync {
    /// Start a rebuild and return immediately.
    ///
    /// Failures are logged and never reported to the caller.
    fn fire(&self);
}

/// [`RebuildTrigger`] that POSTs an empty body to the updater.
#[derive(Clone)]
pub struct HttpRebuildTrigger {
    client: Client,
    url: String,
}

impl HttpRebuildTrigger {
    pub fn new(url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            url: url.into(),
        })
    }

    /// POST once and return the response body.
    pub async fn invoke(&self) -> Result<String, RebuildError> {
        let response = self.client.post(&self.url).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(RebuildError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

impl RebuildTrigger for HttpRebuildTrigger {
    fn fire(&self) {
        let trigger = self.clone();
        tokio::spawn(async move {
            match trigger.invoke().await {
                Ok(body) => info!(
                    url = %trigger.url,
                    response = %body,
                    "gallery_rebuild_triggered"
                ),
                Err(e) => error!(
                    url = %trigger.url,
                    error = %e,
                    "gallery_rebuild_trigger_failed"
                ),
            }
        });
        info!(url = %self.url, "gallery_rebuild_scheduled");
    }
}
