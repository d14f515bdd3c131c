//! Archive decomposition: MHTML bytes → HTML text + resource map.
//!
//! ## Why mail-parser?
//!
//! MHTML is the email multipart container pressed into service as a web
//! archive: a part tree where each node may itself contain nested parts.
//! `mail-parser` already models that tree and exposes it as a flat part
//! list, which is exactly the single flattened walk this stage needs —
//! building a MIME parser by hand would be re-engineering a solved problem.
//!
//! Two part categories matter here:
//!
//! * exactly `text/html` — the document itself. When an archive carries
//!   several HTML parts, the **last one encountered wins**; this mirrors
//!   long-standing converter behaviour that downstream fixtures rely on.
//! * `image/*` or `application/octet-stream` with a base64 transfer
//!   encoding — embedded resources, re-encoded into data URIs keyed by the
//!   final path segment of their Content-Location.
//!
//! Everything else in the archive is ignored. Resource-level problems
//! (no Content-Location, unrecoverable payload) drop that one resource and
//! never fail the job.

use crate::error::{Mhtml2PdfError, ResourceError};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mail_parser::{MessageParser, MimeHeaders, PartType};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, warn};

/// Resource key (final Content-Location path segment) → data URI.
///
/// Keys are unique; last writer wins on collision. Archives should not
/// contain duplicate locations, but a duplicate is not worth failing over.
pub type ResourceMap = HashMap<String, String>;

/// Product of the archive walk.
#[derive(Debug, Default)]
pub struct ExtractedArchive {
    /// The decoded HTML document, if the archive contained one.
    pub html: Option<String>,
    /// Inlineable binary parts as data URIs.
    pub resources: ResourceMap,
    /// Resources dropped for non-fatal reasons.
    pub dropped_resources: usize,
}

/// Decompose raw archive bytes into HTML text and a resource map.
///
/// `origin` is only used for error context.
///
/// # Errors
/// * [`Mhtml2PdfError::ArchiveParseFailed`] — not a MIME structure at all.
/// * [`Mhtml2PdfError::HtmlDecodeFailed`] — an HTML part exists but its
///   payload is not valid UTF-8 text.
///
/// A missing HTML part is *not* an error here: the caller decides whether
/// `html: None` is fatal (the conversion pipeline treats it as one).
pub fn parse_archive(bytes: &[u8], origin: &Path) -> Result<ExtractedArchive, Mhtml2PdfError> {
    let message = MessageParser::default()
        .parse(bytes)
        .ok_or_else(|| Mhtml2PdfError::ArchiveParseFailed {
            path: origin.to_path_buf(),
        })?;

    let mut out = ExtractedArchive::default();

    // `message.parts` is the flattened walk over the whole part tree,
    // intermediate multipart nodes included, in document order.
    for part in &message.parts {
        let Some(ctype) = part.content_type() else {
            continue;
        };
        let main = ctype.ctype();
        let sub = ctype.subtype().unwrap_or("");

        if main.eq_ignore_ascii_case("text") && sub.eq_ignore_ascii_case("html") {
            // Last HTML part wins, without error.
            out.html = Some(html_text(part, origin)?);
            continue;
        }

        let inlineable = main.eq_ignore_ascii_case("image")
            || (main.eq_ignore_ascii_case("application") && sub.eq_ignore_ascii_case("octet-stream"));
        let is_base64 = part
            .content_transfer_encoding()
            .is_some_and(|enc| enc.trim().eq_ignore_ascii_case("base64"));

        if inlineable && is_base64 {
            match resource_entry(part, main, sub) {
                Ok((key, data_uri)) => {
                    debug!("resource '{}' → {} bytes of data URI", key, data_uri.len());
                    out.resources.insert(key, data_uri);
                }
                Err(err) => {
                    warn!("{err}");
                    out.dropped_resources += 1;
                }
            }
        }
        // Any other content type: not stored, not an error.
    }

    Ok(out)
}

/// Decode an HTML part's payload as UTF-8 text.
fn html_text(part: &mail_parser::MessagePart<'_>, origin: &Path) -> Result<String, Mhtml2PdfError> {
    match &part.body {
        PartType::Html(text) | PartType::Text(text) => Ok(text.to_string()),
        _ => std::str::from_utf8(part.contents())
            .map(str::to_owned)
            .map_err(|e| Mhtml2PdfError::HtmlDecodeFailed {
                path: origin.to_path_buf(),
                detail: e.to_string(),
            }),
    }
}

/// Build a `(key, data URI)` pair for one inlineable binary part.
fn resource_entry(
    part: &mail_parser::MessagePart<'_>,
    main: &str,
    sub: &str,
) -> Result<(String, String), ResourceError> {
    let mime = format!(
        "{}/{}",
        main.to_ascii_lowercase(),
        sub.to_ascii_lowercase()
    );

    // A part nothing can reference is useless; drop it silently (the log
    // line is the whole diagnostic).
    let location = part
        .content_location()
        .ok_or_else(|| ResourceError::MissingLocation {
            content_type: mime.clone(),
        })?;

    let payload = part.contents();
    if payload.is_empty() {
        // The declared-base64 body decoded to nothing: malformed payload.
        return Err(ResourceError::Base64Decode {
            location: location.to_string(),
            detail: "payload decoded to zero bytes".into(),
        });
    }

    // Key on the final path segment, exactly as references in the HTML do.
    let key = location.split('/').next_back().unwrap_or(location);
    let data_uri = format!("data:{};base64,{}", mime, STANDARD.encode(payload));
    Ok((key.to_string(), data_uri))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn origin() -> PathBuf {
        PathBuf::from("fixture.mht")
    }

    /// Build a minimal two-boundary MHTML document for tests.
    fn mhtml(parts: &[(&str, &[(&str, &str)], &str)]) -> Vec<u8> {
        let mut s = String::from(
            "From: <Saved by test>\r\n\
             Subject: fixture\r\n\
             MIME-Version: 1.0\r\n\
             Content-Type: multipart/related; boundary=\"----=_BOUNDARY\"\r\n\r\n",
        );
        for (ctype, headers, body) in parts {
            s.push_str("------=_BOUNDARY\r\n");
            s.push_str(&format!("Content-Type: {ctype}\r\n"));
            for (k, v) in *headers {
                s.push_str(&format!("{k}: {v}\r\n"));
            }
            s.push_str("\r\n");
            s.push_str(body);
            s.push_str("\r\n");
        }
        s.push_str("------=_BOUNDARY--\r\n");
        s.into_bytes()
    }

    #[test]
    fn extracts_single_html_part() {
        let bytes = mhtml(&[("text/html; charset=\"utf-8\"", &[], "<html><body>Hi</body></html>")]);
        let archive = parse_archive(&bytes, &origin()).unwrap();
        assert!(archive.html.as_deref().unwrap().contains("Hi"));
        assert!(archive.resources.is_empty());
    }

    #[test]
    fn last_html_part_wins() {
        let bytes = mhtml(&[
            ("text/html", &[], "Hello"),
            ("text/html", &[], "World"),
        ]);
        let archive = parse_archive(&bytes, &origin()).unwrap();
        assert_eq!(archive.html.as_deref(), Some("World"));
    }

    #[test]
    fn no_html_part_is_none_not_error() {
        let bytes = mhtml(&[("text/plain", &[], "just text")]);
        let archive = parse_archive(&bytes, &origin()).unwrap();
        assert!(archive.html.is_none());
    }

    #[test]
    fn base64_image_becomes_data_uri() {
        // "AAAA" is 3 zero bytes.
        let bytes = mhtml(&[
            ("text/html", &[], "<img src=\"logo.png\">"),
            (
                "image/png",
                &[
                    ("Content-Transfer-Encoding", "base64"),
                    ("Content-Location", "http://example.com/assets/logo.png"),
                ],
                "AAAA",
            ),
        ]);
        let archive = parse_archive(&bytes, &origin()).unwrap();
        let uri = archive.resources.get("logo.png").expect("keyed by last segment");
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(uri, "data:image/png;base64,AAAA");
    }

    #[test]
    fn octet_stream_is_inlineable() {
        let bytes = mhtml(&[(
            "application/octet-stream",
            &[
                ("Content-Transfer-Encoding", "base64"),
                ("Content-Location", "blob.bin"),
            ],
            "AAAA",
        )]);
        let archive = parse_archive(&bytes, &origin()).unwrap();
        assert!(archive.resources["blob.bin"].starts_with("data:application/octet-stream;base64,"));
    }

    #[test]
    fn resource_without_location_is_dropped() {
        let bytes = mhtml(&[(
            "image/gif",
            &[("Content-Transfer-Encoding", "base64")],
            "AAAA",
        )]);
        let archive = parse_archive(&bytes, &origin()).unwrap();
        assert!(archive.resources.is_empty());
        assert_eq!(archive.dropped_resources, 1);
    }

    #[test]
    fn malformed_base64_resource_is_dropped() {
        // No valid base64 symbols at all, so the payload decodes to
        // nothing.
        let bytes = mhtml(&[
            ("text/html", &[], "<img src=\"bad.png\">"),
            (
                "image/png",
                &[
                    ("Content-Transfer-Encoding", "base64"),
                    ("Content-Location", "bad.png"),
                ],
                "%%%%",
            ),
        ]);
        let archive = parse_archive(&bytes, &origin()).unwrap();
        assert!(archive.resources.is_empty());
        assert_eq!(archive.dropped_resources, 1);
        assert!(archive.html.is_some());
    }

    #[test]
    fn non_base64_image_is_ignored() {
        let bytes = mhtml(&[(
            "image/png",
            &[
                ("Content-Transfer-Encoding", "binary"),
                ("Content-Location", "raw.png"),
            ],
            "rawbytes",
        )]);
        let archive = parse_archive(&bytes, &origin()).unwrap();
        assert!(archive.resources.is_empty());
        // Ignored entirely, not a dropped-resource diagnostic.
        assert_eq!(archive.dropped_resources, 0);
    }

    #[test]
    fn uninteresting_types_are_skipped() {
        let bytes = mhtml(&[
            ("text/css", &[("Content-Location", "style.css")], "body{}"),
            ("text/html", &[], "<p>doc</p>"),
        ]);
        let archive = parse_archive(&bytes, &origin()).unwrap();
        assert!(archive.resources.is_empty());
        assert!(archive.html.is_some());
    }

    #[test]
    fn duplicate_locations_last_writer_wins() {
        let bytes = mhtml(&[
            (
                "image/png",
                &[
                    ("Content-Transfer-Encoding", "base64"),
                    ("Content-Location", "a/pic.png"),
                ],
                "AAAA",
            ),
            (
                "image/png",
                &[
                    ("Content-Transfer-Encoding", "base64"),
                    ("Content-Location", "b/pic.png"),
                ],
                "BBBB",
            ),
        ]);
        let archive = parse_archive(&bytes, &origin()).unwrap();
        assert_eq!(archive.resources.len(), 1);
        assert_eq!(archive.resources["pic.png"], "data:image/png;base64,BBBB");
    }

    #[test]
    fn garbage_bytes_fail_to_parse() {
        // mail-parser is lenient, so only truly empty input is guaranteed
        // to be rejected.
        let err = parse_archive(b"", &origin()).unwrap_err();
        assert!(matches!(err, Mhtml2PdfError::ArchiveParseFailed { .. }));
    }
}
