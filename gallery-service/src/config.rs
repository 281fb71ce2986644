//! Configuration module for environment variable parsing.
//!
//! Both binaries read their configuration once at startup. Required values are
//! validated here so a misconfigured process refuses to start instead of failing
//! on the first webhook.

use std::env;
use std::time::Duration;

use thiserror::Error;
use tracing::warn;

/// Region used when `AWS_REGION` is not set.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Configuration errors raised at startup.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    Missing(&'static str),

    #[error("{name} has an invalid value: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Uploader configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Bucket receiving the uploaded photos
    pub destination_bucket: String,

    /// Endpoint POSTed to after a successful upload
    pub update_api_url: String,

    /// Sender identifiers allowed to upload
    pub allowed_senders: Vec<String>,

    /// AWS region for the storage client
    pub aws_region: String,

    /// Port for the web server to listen on
    pub port: u16,

    /// Timeout applied to outbound HTTP calls; transport default when unset
    pub outbound_timeout_ms: Option<u64>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let destination_bucket = required(&lookup, "S3_BUCKET")?;
        let update_api_url = required(&lookup, "UPDATE_API_URL")?;

        let allowed_senders = parse_csv(lookup("ALLOWED_SENDERS"))
            .filter(|senders| !senders.is_empty())
            .ok_or(ConfigError::Missing("ALLOWED_SENDERS"))?;

        require_aws_credentials(&lookup)?;

        Ok(Config {
            destination_bucket,
            update_api_url,
            allowed_senders,
            aws_region: region(&lookup),
            port: parse_or(&lookup, "PORT", 8080)?,
            outbound_timeout_ms: parse_optional(&lookup, "OUTBOUND_TIMEOUT_MS")?,
        })
    }

    /// Outbound HTTP timeout as a `Duration`.
    pub fn outbound_timeout(&self) -> Option<Duration> {
        self.outbound_timeout_ms.map(Duration::from_millis)
    }
}

/// Gallery updater configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct UpdaterConfig {
    /// Bucket the photos are read from
    pub photo_bucket: String,

    /// Bucket hosting the generated site
    pub site_bucket: String,

    /// Public URL prefix that photo keys are appended to in the manifest
    pub photo_base_url: String,

    /// Working directory of the static site
    pub site_dir: String,

    /// Site generator executable
    pub hugo_bin: String,

    pub aws_region: String,

    pub port: u16,
}

impl UpdaterConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let photo_bucket = required(&lookup, "PHOTO_BUCKET")?;
        let site_bucket = required(&lookup, "SITE_BUCKET")?;

        require_aws_credentials(&lookup)?;

        let photo_base_url = non_empty(lookup("PHOTO_BASE_URL"))
            .map(|url| url.trim_end_matches('/').to_string())
            .unwrap_or_else(|| format!("https://{}.s3.amazonaws.com", photo_bucket));

        Ok(UpdaterConfig {
            photo_bucket,
            site_bucket,
            photo_base_url,
            site_dir: non_empty(lookup("SITE_DIR")).unwrap_or_else(|| ".".to_string()),
            hugo_bin: non_empty(lookup("HUGO_BIN")).unwrap_or_else(|| "hugo".to_string()),
            aws_region: region(&lookup),
            port: parse_or(&lookup, "PORT", 8080)?,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required<F>(lookup: &F, name: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup(name)).ok_or(ConfigError::Missing(name))
}

/// The storage client reads credentials itself; this only checks they exist.
fn require_aws_credentials<F>(lookup: &F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    required(lookup, "AWS_ACCESS_KEY_ID")?;
    required(lookup, "AWS_SECRET_ACCESS_KEY")?;
    Ok(())
}

fn region<F>(lookup: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup("AWS_REGION")).unwrap_or_else(|| {
        warn!(default_region = DEFAULT_REGION, "aws_region_not_set");
        DEFAULT_REGION.to_string()
    })
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    Ok(parse_optional(lookup, name)?.unwrap_or(default))
}

fn parse_optional<F, T>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match non_empty(lookup(name)) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
    }
}

/// Parse a comma-separated list of strings.
fn parse_csv(raw: Option<String>) -> Option<Vec<String>> {
    raw.map(|raw| {
        raw.split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    })
}
