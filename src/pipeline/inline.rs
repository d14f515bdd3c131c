//! Resource inlining: rewrite resource references as data URIs so the
//! document renders with no external file dependencies.
//!
//! ## Why text substitution, not a tree rewrite?
//!
//! The normalizer already did its structural pass and serialized; touching
//! the tree again here would re-serialize a second time and risk entity
//! and whitespace churn with no benefit. The references this stage targets
//! are exactly two attribute shapes (`src="…"` and `data-image-src="…"`)
//! with exact-match keys, so a literal substitution is both sufficient and
//! the most faithful transformation: keys absent from the map are left
//! untouched (a broken reference, not an error).

use crate::pipeline::archive::ResourceMap;
use tracing::debug;

/// The attribute names whose exact-match values are rewritten.
const REF_ATTRIBUTES: [&str; 2] = ["src", "data-image-src"];

/// Replace every resolvable `src`/`data-image-src` reference with its
/// data URI. Infallible; unresolvable references pass through unchanged.
pub fn inline_resources(html: &str, resources: &ResourceMap) -> String {
    let mut document = html.to_string();
    for (key, data_uri) in resources {
        for attr in REF_ATTRIBUTES {
            let needle = format!("{attr}=\"{key}\"");
            if document.contains(&needle) {
                let replacement = format!("{attr}=\"{data_uri}\"");
                debug!("inlining {} reference '{}'", attr, key);
                document = document.replace(&needle, &replacement);
            }
        }
    }
    document
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map(entries: &[(&str, &str)]) -> ResourceMap {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn replaces_src_with_data_uri() {
        let resources = map(&[("logo.png", "data:image/png;base64,AAAA")]);
        let out = inline_resources("<img src=\"logo.png\">", &resources);
        assert_eq!(out, "<img src=\"data:image/png;base64,AAAA\">");
    }

    #[test]
    fn replaces_data_image_src() {
        let resources = map(&[("photo.jpg", "data:image/jpeg;base64,QkJC")]);
        let out = inline_resources("<div data-image-src=\"photo.jpg\"></div>", &resources);
        assert_eq!(out, "<div data-image-src=\"data:image/jpeg;base64,QkJC\"></div>");
    }

    #[test]
    fn unmapped_reference_left_untouched() {
        let resources = map(&[("logo.png", "data:image/png;base64,AAAA")]);
        let html = "<img src=\"logo.png\"><img src=\"other.png\">";
        let out = inline_resources(html, &resources);
        assert!(out.contains("src=\"data:image/png;base64,AAAA\""));
        assert!(out.contains("src=\"other.png\""));
    }

    #[test]
    fn exact_match_only_no_partial_paths() {
        // A key must match the whole attribute value, not a suffix of it.
        let resources = map(&[("logo.png", "data:image/png;base64,AAAA")]);
        let out = inline_resources("<img src=\"img/logo.png\">", &resources);
        assert_eq!(out, "<img src=\"img/logo.png\">");
    }

    #[test]
    fn every_occurrence_is_rewritten() {
        let resources = map(&[("a.png", "data:image/png;base64,AA==")]);
        let out = inline_resources("<img src=\"a.png\"><img src=\"a.png\">", &resources);
        assert_eq!(out.matches("data:image/png").count(), 2);
        assert!(!out.contains("src=\"a.png\""));
    }

    #[test]
    fn empty_map_is_identity() {
        let html = "<img src=\"logo.png\">";
        assert_eq!(inline_resources(html, &ResourceMap::new()), html);
    }
}
