//! Media location - resolving transient media URLs to their storage location.
//!
//! The provider's media URL answers with a redirect to the object in the
//! provider's bucket. The redirect is intercepted rather than followed so the
//! bucket and object key can be read from its target path.

use std::time::Duration;

use async_trait::async_trait;
use percent_encoding::percent_decode_str;
use reqwest::{header::LOCATION, redirect::Policy, Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use url::Url;

/// Hosts with this prefix are cross-region aliases and are not trusted as a
/// key source.
pub const EXTERNAL_HOST_PREFIX: &str = "s3-external-";

/// Errors raised while locating a media file.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("media location request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("unable to find the file location (status {status})")]
    NotFound { status: u16 },

    #[error("redirect response carried no usable Location header")]
    MissingLocation,

    #[error("redirect target {target:?} is not a valid URL")]
    InvalidTarget { target: String },

    #[error("redirect to untrusted host {host}")]
    RedirectRejected { host: String },

    #[error("redirect path {path:?} does not name a bucket and object key")]
    UnexpectedPath { path: String },
}

/// Storage coordinate of one attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedLocation {
    /// Scheme, host and encoded path of the authoritative object
    pub hostname: String,
    /// Bucket holding the object (first path segment)
    pub bucket: String,
    /// Decoded object key within the bucket (path after the bucket segment)
    pub key: String,
    /// Full redirect target path
    pub full_path: String,
}

impl ResolvedLocation {
    /// Build a location from a redirect target.
    ///
    /// The target path must look like `/<bucket>/<key>`. Bucket and key are
    /// percent-decoded; `hostname` keeps the encoded path for fetching.
    pub fn from_redirect(target: &Url) -> Result<Self, LocateError> {
        let host = target
            .host_str()
            .ok_or_else(|| LocateError::InvalidTarget {
                target: target.to_string(),
            })?;

        if host.starts_with(EXTERNAL_HOST_PREFIX) {
            return Err(LocateError::RedirectRejected {
                host: host.to_string(),
            });
        }

        let path = target.path();
        let (bucket, key) = split_bucket_key(path).ok_or_else(|| LocateError::UnexpectedPath {
            path: path.to_string(),
        })?;

        let authority = match target.port() {
            Some(port) => format!("{}:{}", host, port),
            None => host.to_string(),
        };

        Ok(Self {
            hostname: format!("{}://{}{}", target.scheme(), authority, path),
            bucket,
            key,
            full_path: path.to_string(),
        })
    }
}

/// Split an encoded `/<bucket>/<key>` path into its decoded parts.
fn split_bucket_key(path: &str) -> Option<(String, String)> {
    let (bucket, key) = path.strip_prefix('/')?.split_once('/')?;
    let bucket = percent_decode_str(bucket).decode_utf8().ok()?;
    let key = percent_decode_str(key).decode_utf8().ok()?;
    if bucket.is_empty() || key.is_empty() || key.ends_with('/') {
        return None;
    }
    Some((bucket.into_owned(), key.into_owned()))
}

/// Resolves a transient media URL to its storage location.
#[async_trait]
pub trait MediaLocator: Send + Sync {
    async fn locate(&self, media_url: &str) -> Result<ResolvedLocation, LocateError>;
}

/// [`MediaLocator`] that intercepts the first HTTP redirect.
#[derive(Clone)]
pub struct HttpMediaLocator {
    client: Client,
}

impl HttpMediaLocator {
    /// Create a locator whose client never follows redirects.
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder().redirect(Policy::none());
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }
}

fn is_intercepted_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::TEMPORARY_REDIRECT
    )
}

#[async_trait]
impl MediaLocator for HttpMediaLocator {
    async fn locate(&self, media_url: &str) -> Result<ResolvedLocation, LocateError> {
        let response = self.client.get(media_url).send().await?;
        let status = response.status();

        if !is_intercepted_redirect(status) {
            warn!(
                media_url = %media_url,
                status_code = status.as_u16(),
                "media_location_not_found"
            );
            return Err(LocateError::NotFound {
                status: status.as_u16(),
            });
        }

        let location = response
            .headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(LocateError::MissingLocation)?;

        let target = response
            .url()
            .join(location)
            .map_err(|_| LocateError::InvalidTarget {
                target: location.to_string(),
            })?;

        info!(
            media_url = %media_url,
            status_code = status.as_u16(),
            redirect_target = %target,
            "media_redirect_intercepted"
        );

        let resolved = ResolvedLocation::from_redirect(&target)?;

        info!(
            hostname = %resolved.hostname,
            bucket = %resolved.bucket,
            key = %resolved.key,
            full_path = %resolved.full_path,
            "media_location_resolved"
        );

        Ok(resolved)
    }
}
