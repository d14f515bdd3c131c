//! Content normalization: repair transfer-encoding artifacts and strip
//! vendor markup noise from the decoded HTML.
//!
//! ## Rule Order
//!
//! The textual rules must run in this exact order before the tree pass:
//! `=3D` → `=` first (the most common quoted-printable leftover), then
//! `=2D` → space, then soft-break removal. Later steps assume earlier ones
//! ran; reordering changes observable output on real Word exports.
//!
//! ## The `=2D` quirk
//!
//! `=2D` is quoted-printable for a hyphen, not a space. Replacing it with a
//! space is deliberate compatibility with the converter this one replaces,
//! which was tuned against one vendor's Word-export behaviour. Do not
//! "fix" it without a product decision.
//!
//! ## Why a tree pass at all?
//!
//! Office's single-file-web-page export wraps content in `<xml>` islands and
//! empty `<o:p>`/`<div>` scaffolding that confuses rendering engines. Text
//! substitution cannot remove elements safely; the structural pass parses
//! the document, detaches the noise, and serializes back.

use crate::error::Mhtml2PdfError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;
use tracing::debug;

/// Quoted-printable soft line break: `=` immediately before a newline.
/// CRLF is tolerated since archives are saved with either convention.
static RE_SOFT_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"=\r?\n").unwrap());

/// Tags removed wherever they appear (Microsoft Office export artifacts).
const NOISE_TAGS: [&str; 2] = ["xml", "o:p"];

/// Clean decoded HTML: undo quoted-printable artifacts, drop Office noise.
///
/// This is the single required precondition check in the pipeline: empty or
/// whitespace-only input is an input-validation error, never silently
/// returned as empty output.
///
/// The textual substitutions are idempotent: running the normalizer on its
/// own output leaves no `=3D`, `=2D`, or soft-break patterns behind.
pub fn clean_html(html: &str) -> Result<String, Mhtml2PdfError> {
    if html.trim().is_empty() {
        return Err(Mhtml2PdfError::EmptyHtml);
    }

    let text = html.replace("=3D", "=").replace("=2D", " ");
    let text = RE_SOFT_BREAK.replace_all(&text, "");

    let mut document = Html::parse_document(&text);
    let removed = strip_noise_elements(&mut document);
    let removed_divs = strip_empty_divs(&mut document);
    debug!(
        "normalizer removed {} noise elements, {} empty divs",
        removed, removed_divs
    );

    Ok(document.root_element().html())
}

/// Detach every `<xml>` and `<o:p>` element, anywhere in the tree.
fn strip_noise_elements(document: &mut Html) -> usize {
    let ids: Vec<_> = document
        .tree
        .root()
        .descendants()
        .filter(|node| {
            node.value()
                .as_element()
                .is_some_and(|el| NOISE_TAGS.contains(&el.name()))
        })
        .map(|node| node.id())
        .collect();

    for id in &ids {
        if let Some(mut node) = document.tree.get_mut(*id) {
            node.detach();
        }
    }
    ids.len()
}

/// Detach every `<div>` with no children at all (no text, no elements).
///
/// Single snapshot pass over the tree as it stands after the noise pass;
/// divs that only become empty through these removals are left for the
/// next conversion's renderer to cope with, matching the original
/// converter's observable behaviour.
fn strip_empty_divs(document: &mut Html) -> usize {
    let ids: Vec<_> = document
        .tree
        .root()
        .descendants()
        .filter(|node| {
            node.value().as_element().is_some_and(|el| el.name() == "div")
                && node.children().next().is_none()
        })
        .map(|node| node.id())
        .collect();

    for id in &ids {
        if let Some(mut node) = document.tree.get_mut(*id) {
            node.detach();
        }
    }
    ids.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_a_validation_error() {
        assert!(matches!(clean_html(""), Err(Mhtml2PdfError::EmptyHtml)));
        assert!(matches!(
            clean_html("   \n\t  "),
            Err(Mhtml2PdfError::EmptyHtml)
        ));
    }

    #[test]
    fn undoes_equals_escape() {
        let out = clean_html("<p>a =3D b</p>").unwrap();
        assert!(out.contains("a = b"));
        assert!(!out.contains("=3D"));
    }

    #[test]
    fn replaces_2d_with_space() {
        // Deliberately a space, not a hyphen.
        let out = clean_html("<p>one=2Dtwo</p>").unwrap();
        assert!(out.contains("one two"));
        assert!(!out.contains("=2D"));
    }

    #[test]
    fn removes_soft_line_breaks() {
        let out = clean_html("<p>unbro=\nken and cr=\r\nlf</p>").unwrap();
        assert!(out.contains("unbroken"));
        assert!(out.contains("crlf"));
    }

    #[test]
    fn substitution_order_composes() {
        let out = clean_html("<p>x =3D=2Dy=\nz</p>").unwrap();
        assert!(!out.contains("=3D"));
        assert!(!out.contains("=2D"));
        assert!(!out.contains("=\n"));
    }

    #[test]
    fn strips_office_noise_tags() {
        let out = clean_html(
            "<html><body><xml><w:data>junk</w:data></xml><p>keep<o:p></o:p></p></body></html>",
        )
        .unwrap();
        assert!(!out.contains("<xml"));
        assert!(!out.contains("o:p"));
        assert!(!out.contains("junk"));
        assert!(out.contains("keep"));
    }

    #[test]
    fn strips_childless_divs_at_any_depth() {
        let out = clean_html(
            "<html><body><div><div></div><p>text</p></div><div></div></body></html>",
        )
        .unwrap();
        assert!(out.contains("text"));
        // Only the outer div with content survives.
        assert_eq!(out.matches("<div>").count(), 1);
    }

    #[test]
    fn div_with_text_survives() {
        let out = clean_html("<div>hello</div>").unwrap();
        assert!(out.contains("<div>hello</div>"));
    }

    #[test]
    fn textual_rules_are_idempotent() {
        let once = clean_html("<p>a=3Db =2D c=\nd</p>").unwrap();
        let twice = clean_html(&once).unwrap();
        assert_eq!(once, twice);
        for pattern in ["=3D", "=2D", "=\n"] {
            assert!(!twice.contains(pattern), "leftover {pattern}");
        }
    }

    #[test]
    fn output_reparses() {
        let out = clean_html("<html><body><p>x</p></body></html>").unwrap();
        let reparsed = Html::parse_document(&out);
        assert!(reparsed.root_element().html().contains("<p>x</p>"));
    }
}
