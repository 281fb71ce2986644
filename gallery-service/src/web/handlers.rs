//! HTTP endpoint handlers.
//!
//! The SMS webhook answers 200 for every business outcome, rejected senders
//! included, so the provider never redelivers. Only a request that failed
//! part-way gets a 500.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::gallery::GalleryBuilder;
use crate::pipeline::IngestionPipeline;

/// Shared uploader state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IngestionPipeline>,
}

impl AppState {
    pub fn new(pipeline: IngestionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Shared updater state.
#[derive(Clone)]
pub struct UpdaterState {
    pub builder: Arc<GalleryBuilder>,
}

impl UpdaterState {
    pub fn new(builder: GalleryBuilder) -> Self {
        Self {
            builder: Arc::new(builder),
        }
    }
}

/// Routes served by the uploader.
pub fn uploader_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/about", get(about))
        .route("/sms", post(sms_webhook))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Routes served by the updater.
pub fn updater_router(state: UpdaterState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/update", post(update_gallery))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// =============================================================================
// Health Check
// =============================================================================

/// Health check response.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

#[derive(Serialize)]
pub struct AboutResponse {
    pub name: &'static str,
    pub version: &'static str,
}

pub async fn about() -> Json<AboutResponse> {
    Json(AboutResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// SMS Webhook
// =============================================================================

/// Wrap `message` in a TwiML reply.
pub fn twiml_reply(message: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Response>\n<Message>{}</Message>\n</Response>\n",
        escape_xml(message)
    )
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Inbound MMS webhook endpoint.
///
/// The raw form body goes straight to the pipeline; the reply message depends
/// on the outcome.
pub async fn sms_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    info!(body_length = body.len(), "sms_webhook_received");

    match state.pipeline.ingest(&body).await {
        Ok(outcome) => {
            let message = outcome.message();
            info!(outcome = ?outcome, reply = %message, "sms_webhook_handled");
            (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "text/xml")],
                twiml_reply(&message),
            )
                .into_response()
        }
        Err(e) => {
            error!(error = %e, "sms_webhook_failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

// =============================================================================
// Gallery Update
// =============================================================================

/// Gallery rebuild endpoint, called by the uploader's rebuild trigger.
pub async fn update_gallery(State(state): State<UpdaterState>) -> Response {
    info!("gallery_update_requested");

    match state.builder.rebuild().await {
        Ok(summary) => {
            info!(photos = summary.photos, "gallery_update_complete");
            (StatusCode::OK, "OK").into_response()
        }
        Err(e) => {
            error!(error = %e, "gallery_update_failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}
