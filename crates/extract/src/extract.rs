//! Label extraction from lookup pages.

use crate::consts;
use crate::error::{ErrorKind, Result};
use exn::OptionExt;
use scraper::{ElementRef, Html};
use tracing::instrument;

/// Easy, top-level entrypoint for extracting a label from raw HTML bytes.
///
/// Accepts raw bytes, instead of requiring HTML to be valid UTF-8. Invalid byte
/// sequences are replaced with U+FFFD before parsing.
///
/// # Examples
///
/// ```rust
/// let html = r#"
///     <p>
///         <span class="genre" onmouseover="hoverdiv('a')"><a href="/star/a">Jane Doe</a></span>
///     </p>
/// "#;
/// assert_eq!(shelve_extract::extract(html).unwrap(), "Jane Doe");
/// ```
#[instrument(skip(html), fields(html_size = html.as_ref().len()))]
pub fn extract(html: impl AsRef<[u8]>) -> Result<String> {
    let html = String::from_utf8_lossy(html.as_ref());
    let document = Html::parse_document(&html);
    self::label(&document)
}

/// Extracts the label from an already-parsed document.
///
/// Only the *first* marker element is considered: if it has no link, or the
/// link has no text, the document is treated as having no label even when a
/// later marker would have one.
///
/// # Errors
///
/// Returns [`ErrorKind::MissingField`] if:
/// - there is no marker element (`"marker"`),
/// - the marker has no nested link (`"link"`), or
/// - the link text is empty after trimming (`"label"`).
#[instrument(level = "trace", skip(document))]
pub fn label(document: &Html) -> Result<String> {
    let marker = self::marker(document).ok_or_raise(|| ErrorKind::MissingField("marker"))?;
    let link = marker.select(&consts::ANCHOR_SELECTOR).next().ok_or_raise(|| ErrorKind::MissingField("link"))?;
    Some(link.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_raise(|| ErrorKind::MissingField("label"))
}

fn marker(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&consts::MARKER_SELECTOR).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn page(body: &str) -> String {
        format!("<!DOCTYPE html><html><head><title>ABC-123</title></head><body>{body}</body></html>")
    }

    #[test]
    fn test_trims_label() {
        let html = page(r#"<span class="genre" onmouseover="hoverdiv('x')"><a href="/star/x"> Foo Bar </a></span>"#);
        assert_eq!(extract(html).unwrap(), "Foo Bar");
    }

    #[test]
    fn test_nested_markup_in_link() {
        let html = page(r#"<span class="genre" onmouseover="hoverdiv('x')"><a href="/x">Foo <b>Bar</b></a></span>"#);
        assert_eq!(extract(html).unwrap(), "Foo Bar");
    }

    #[test]
    fn test_first_marker_wins() {
        let html = page(
            r#"
            <span class="genre"><a href="/genre/1">Drama</a></span>
            <span class="genre" onmouseover="hoverdiv('a')"><a href="/star/a">First</a></span>
            <span class="genre" onmouseover="hoverdiv('b')"><a href="/star/b">Second</a></span>
            "#,
        );
        assert_eq!(extract(html).unwrap(), "First");
    }

    #[test]
    fn test_marker_with_extra_classes() {
        let html = page(r#"<span class="star genre" onmouseover="hoverdiv('x')"><a href="/x">Jane</a></span>"#);
        assert_eq!(extract(html).unwrap(), "Jane");
    }

    #[rstest]
    #[case::empty_document("", "marker")]
    #[case::genre_without_hover(r#"<span class="genre"><a href="/genre/1">Drama</a></span>"#, "marker")]
    #[case::hover_without_hoverdiv(r#"<span class="genre" onmouseover="other()"><a>Jane</a></span>"#, "marker")]
    #[case::hover_on_wrong_element(r#"<div class="genre" onmouseover="hoverdiv('x')"><a>Jane</a></div>"#, "marker")]
    #[case::no_link(r#"<span class="genre" onmouseover="hoverdiv('x')">Jane</span>"#, "link")]
    #[case::blank_link(r#"<span class="genre" onmouseover="hoverdiv('x')"><a href="/x">   </a></span>"#, "label")]
    fn test_missing(#[case] body: &str, #[case] field: &'static str) {
        let err = extract(page(body)).unwrap_err();
        assert_eq!(*err, ErrorKind::MissingField(field));
    }

    #[test]
    fn test_only_first_marker_considered() {
        let html = page(
            r#"
            <span class="genre" onmouseover="hoverdiv('a')">No link here</span>
            <span class="genre" onmouseover="hoverdiv('b')"><a href="/star/b">Second</a></span>
            "#,
        );
        assert_eq!(*extract(html).unwrap_err(), ErrorKind::MissingField("link"));
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let mut html = page(r#"<span class="genre" onmouseover="hoverdiv('x')"><a href="/x">Jane</a></span>"#)
            .into_bytes();
        html.extend_from_slice(&[0xff, 0xfe, 0xfd]);
        assert_eq!(extract(html).unwrap(), "Jane");
    }
}
