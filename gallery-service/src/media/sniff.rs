//! Content type sniffing for stored media.

/// Number of leading bytes inspected.
pub const SNIFF_LEN: usize = 512;

pub const TEXT_HTML: &str = "text/html; charset=utf-8";
pub const TEXT_XML: &str = "text/xml; charset=utf-8";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Tags that mark a document as HTML when they open it, after whitespace.
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Detect the content type of `bytes` from its first [`SNIFF_LEN`] bytes.
///
/// Markup is recognized first: a leading HTML tag (case-insensitive, followed
/// by a space or `>`) is `text/html`, a leading `<?xml` is `text/xml`. Then
/// known binary signatures win. Otherwise text that is valid UTF-8 and free of
/// binary control bytes is `text/plain`, anything else is an octet stream.
pub fn sniff_content_type(bytes: &[u8]) -> &'static str {
    let window = &bytes[..bytes.len().min(SNIFF_LEN)];

    if let Some(markup) = sniff_markup(window) {
        return markup;
    }

    if let Some(kind) = infer::get(window) {
        return kind.mime_type();
    }

    if looks_like_text(window) {
        TEXT_PLAIN
    } else {
        OCTET_STREAM
    }
}

fn sniff_markup(window: &[u8]) -> Option<&'static str> {
    let start = window
        .iter()
        .position(|&b| !matches!(b, b'\t' | b'\n' | b'\x0C' | b'\r' | b' '))?;
    let data = &window[start..];

    if data.starts_with(b"<?xml") {
        return Some(TEXT_XML);
    }

    HTML_TAGS
        .iter()
        .any(|tag| opens_with_tag(data, tag))
        .then_some(TEXT_HTML)
}

fn opens_with_tag(data: &[u8], tag: &[u8]) -> bool {
    data.len() > tag.len()
        && data[..tag.len()].eq_ignore_ascii_case(tag)
        && matches!(data[tag.len()], b' ' | b'>')
}

fn looks_like_text(window: &[u8]) -> bool {
    if window.iter().any(|&b| is_binary_byte(b)) {
        return false;
    }
    match std::str::from_utf8(window) {
        Ok(_) => true,
        // The window may cut a multi-byte character in half.
        Err(e) => e.error_len().is_none(),
    }
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
