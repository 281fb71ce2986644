//! Inbound MMS message types.
//!
//! Field names follow the webhook provider's form field names.

use serde::Serialize;

/// One media attachment of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    /// Zero-based position, taken from the `MediaUrl<N>` suffix
    pub position: usize,
    /// Transient media reference URL
    pub url: String,
    /// Provider-declared content type (`MediaContentType<N>`)
    pub content_type: Option<String>,
}

/// Structured inbound MMS, built from one webhook request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct InboundMessage {
    /// Sender identifier (`From`)
    pub from: String,
    /// Free-text message body (`Body`)
    pub body: String,
    /// Declared attachment count (`NumMedia`)
    pub num_media: usize,
    /// Attachments ordered by position; always `num_media` long
    pub attachments: Vec<Attachment>,

    pub to: Option<String>,
    pub num_segments: Option<usize>,
    pub message_sid: Option<String>,
    pub sms_message_sid: Option<String>,
    pub sms_sid: Option<String>,
    pub sms_status: Option<String>,
    pub account_sid: Option<String>,
    pub api_version: Option<String>,
    pub from_city: Option<String>,
    pub from_state: Option<String>,
    pub from_zip: Option<String>,
    pub from_country: Option<String>,
    pub to_city: Option<String>,
    pub to_state: Option<String>,
    pub to_zip: Option<String>,
    pub to_country: Option<String>,
}

impl InboundMessage {
    /// Caption stored with the attachment at `position`.
    ///
    /// Multi-attachment messages number their captions, e.g. `"Beach (2/3)"`.
    pub fn caption_for(&self, position: usize) -> String {
        caption(&self.body, position, self.num_media)
    }
}

/// Derive the caption for attachment `position` (zero-based) out of `total`.
pub fn caption(body: &str, position: usize, total: usize) -> String {
    if total > 1 {
        format!("{} ({}/{})", body, position + 1, total)
    } else {
        body.to_string()
    }
}
