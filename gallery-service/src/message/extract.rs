//! Webhook payload extraction.
//!
//! The provider POSTs the message as a form-urlencoded body. Attachments arrive
//! as a variable number of indexed fields (`MediaUrl0`, `MediaUrl1`, ...), which
//! are gathered here into an ordered attachment list.

use std::collections::{BTreeMap, HashMap};

use thiserror::Error;
use tracing::{debug, info, warn};
use url::form_urlencoded;

use super::types::{Attachment, InboundMessage};

const MEDIA_URL_PREFIX: &str = "MediaUrl";
const MEDIA_CONTENT_TYPE_PREFIX: &str = "MediaContentType";

/// Errors raised while decoding a webhook payload.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("{field} is not a valid count: {value:?}")]
    InvalidCount { field: &'static str, value: String },

    #[error("message declares {declared} attachments but MediaUrl{position} is missing")]
    MissingAttachment { declared: usize, position: usize },
}

/// Form body as a multi-map of field name to every submitted value.
#[derive(Debug, Default)]
pub struct FormFields {
    fields: HashMap<String, Vec<String>>,
}

impl FormFields {
    /// Parse a form-urlencoded body. Repeated keys keep every value in order.
    pub fn parse(body: &[u8]) -> Self {
        let mut fields: HashMap<String, Vec<String>> = HashMap::new();
        for (name, value) in form_urlencoded::parse(body) {
            fields
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self { fields }
    }

    /// Iterate over field names paired with their first value.
    pub fn first_values(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().filter_map(|(name, values)| {
            values.first().map(|value| (name.as_str(), value.as_str()))
        })
    }

    fn len(&self) -> usize {
        self.fields.len()
    }
}

/// Decode a webhook body into an [`InboundMessage`].
///
/// Only the first value of each field is used. Count fields must be
/// non-negative integers, and every position below `NumMedia` must carry a
/// `MediaUrl<N>` value.
pub fn extract_message(body: &[u8]) -> Result<InboundMessage, DecodeError> {
    let fields = FormFields::parse(body);

    let mut message = InboundMessage::default();
    let mut media_urls: BTreeMap<usize, String> = BTreeMap::new();
    let mut media_types: BTreeMap<usize, String> = BTreeMap::new();

    for (name, value) in fields.first_values() {
        if let Some(suffix) = name.strip_prefix(MEDIA_URL_PREFIX) {
            match parse_position(suffix) {
                Some(position) => {
                    media_urls.insert(position, value.to_string());
                }
                None => warn!(field = name, "mms_media_field_unindexed"),
            }
            continue;
        }

        if let Some(suffix) = name.strip_prefix(MEDIA_CONTENT_TYPE_PREFIX) {
            if let Some(position) = parse_position(suffix) {
                media_types.insert(position, value.to_string());
            }
            continue;
        }

        let value = value.to_string();
        match name {
            "From" => message.from = value,
            "Body" => message.body = value,
            "NumMedia" => message.num_media = parse_count("NumMedia", value)?,
            "NumSegments" => message.num_segments = Some(parse_count("NumSegments", value)?),
            "To" => message.to = Some(value),
            "MessageSid" => message.message_sid = Some(value),
            "SmsMessageSid" => message.sms_message_sid = Some(value),
            "SmsSid" => message.sms_sid = Some(value),
            "SmsStatus" => message.sms_status = Some(value),
            "AccountSid" => message.account_sid = Some(value),
            "ApiVersion" => message.api_version = Some(value),
            "FromCity" => message.from_city = Some(value),
            "FromState" => message.from_state = Some(value),
            "FromZip" => message.from_zip = Some(value),
            "FromCountry" => message.from_country = Some(value),
            "ToCity" => message.to_city = Some(value),
            "ToState" => message.to_state = Some(value),
            "ToZip" => message.to_zip = Some(value),
            "ToCountry" => message.to_country = Some(value),
            _ => debug!(field = name, "mms_field_ignored"),
        }
    }

    let declared = message.num_media;
    let mut attachments = Vec::with_capacity(declared.min(media_urls.len()));
    for position in 0..declared {
        let url = media_urls
            .remove(&position)
            .filter(|url| !url.is_empty())
            .ok_or(DecodeError::MissingAttachment { declared, position })?;

        attachments.push(Attachment {
            position,
            url,
            content_type: media_types.remove(&position),
        });
    }

    for position in media_urls.keys() {
        warn!(
            position = position,
            num_media = declared,
            "mms_undeclared_attachment_ignored"
        );
    }

    message.attachments = attachments;

    info!(
        from = %message.from,
        num_media = message.num_media,
        body_length = message.body.len(),
        message_sid = ?message.message_sid,
        field_count = fields.len(),
        "mms_extracted"
    );
    debug!(
        message = %serde_json::to_string(&message).unwrap_or_default(),
        "mms_message_decoded"
    );

    Ok(message)
}

/// Parse the numeric suffix of an indexed field, e.g. `"2"` of `MediaUrl2`.
fn parse_position(suffix: &str) -> Option<usize> {
    if suffix.is_empty() || !suffix.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    suffix.parse().ok()
}

fn parse_count(field: &'static str, value: String) -> Result<usize, DecodeError> {
    match value.parse() {
        Ok(count) => Ok(count),
        Err(_) => Err(DecodeError::InvalidCount { field, value }),
    }
}
