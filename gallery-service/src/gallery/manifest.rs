//! Gallery manifest rendering.
//!
//! The manifest is the site's `content/_index.md`: one `figure` shortcode per
//! stored photo inside a `gallery` shortcode.

use serde::Serialize;

/// One photo shown in the gallery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryEntry {
    /// Storage key, e.g. `photos/AC1/img.jpg`
    pub key: String,
    pub caption: String,
}

/// Render the manifest for `entries`, linking each photo under `link_base`.
pub fn render_manifest(entries: &[GalleryEntry], link_base: &str) -> String {
    let mut lines = vec![
        "####".to_string(),
        String::new(),
        "{{< gallery >}}".to_string(),
    ];
    lines.extend(entries.iter().map(|entry| figure_line(entry, link_base)));
    lines.push("{{< /gallery >}}".to_string());

    let mut manifest = lines.join("\n");
    manifest.push('\n');
    manifest
}

fn figure_line(entry: &GalleryEntry, link_base: &str) -> String {
    format!(
        r#"{{{{< figure link="{}/{}" caption="{}" >}}}}"#,
        link_base.trim_end_matches('/'),
        escape_attribute(&entry.key),
        escape_attribute(&entry.caption)
    )
}

fn escape_attribute(value: &str) -> String {
    value.replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(key: &str, caption: &str) -> GalleryEntry {
        GalleryEntry {
            key: key.to_string(),
            caption: caption.to_string(),
        }
    }

    #[test]
    fn test_render_manifest() {
        let manifest = render_manifest(
            &[
                entry("photos/a.jpg", "Beach (1/2)"),
                entry("photos/b.jpg", "Beach (2/2)"),
            ],
            "https://files.example.com",
        );

        assert_eq!(
            manifest,
            "####\n\
             \n\
             {{< gallery >}}\n\
             {{< figure link=\"https://files.example.com/photos/a.jpg\" caption=\"Beach (1/2)\" >}}\n\
             {{< figure link=\"https://files.example.com/photos/b.jpg\" caption=\"Beach (2/2)\" >}}\n\
             {{< /gallery >}}\n"
        );
    }

    #[test]
    fn test_render_empty_gallery() {
        let manifest = render_manifest(&[], "https://files.example.com/");

        assert_eq!(manifest, "####\n\n{{< gallery >}}\n{{< /gallery >}}\n");
    }

    #[test]
    fn test_caption_quotes_escaped() {
        let line = figure_line(&entry("photos/a.jpg", r#"say "cheese""#), "https://f/");

        assert_eq!(
            line,
            r#"{{< figure link="https://f/photos/a.jpg" caption="say &quot;cheese&quot;" >}}"#
        );
    }
}
