//! Inbound MMS message model and webhook payload extraction.
//!
//! ## Processing Flow
//!
//! ```text
//! form-urlencoded body → FormFields → extract_message() → InboundMessage
//! ```

pub mod extract;
pub mod types;

pub use extract::{extract_message, DecodeError, FormFields};
pub use types::{caption, Attachment, InboundMessage};
