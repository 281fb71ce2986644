//! Media handling: locating, downloading and typing attachments.
//!
//! ```text
//! MediaUrl<N> → MediaLocator → ResolvedLocation → MediaFetcher → bytes → sniff
//! ```

pub mod fetcher;
pub mod locator;
pub mod sniff;

pub use fetcher::{FetchError, HttpMediaFetcher, MediaFetcher};
pub use locator::{
    HttpMediaLocator, LocateError, MediaLocator, ResolvedLocation, EXTERNAL_HOST_PREFIX,
};
pub use sniff::sniff_content_type;
