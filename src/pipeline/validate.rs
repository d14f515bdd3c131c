//! PDF acceptance check: can the file be opened and its pages enumerated?
//!
//! The same check serves two purposes:
//!
//! * **Idempotent re-runs** — an output that already validates is treated
//!   as complete and the job is skipped (when the skip mode is on).
//! * **Post-render acceptance** — a render call only counts as successful
//!   if the file it produced passes this check.
//!
//! An existing file that fails the check is simply "not yet converted":
//! the job proceeds and overwrites it.

use lopdf::Document;
use std::path::Path;
use tracing::debug;

/// True when `path` holds a well-formed, openable PDF with at least one
/// page. Any load or parse failure is a plain `false`, never an error.
pub fn is_valid_pdf(path: &Path) -> bool {
    match Document::load(path) {
        Ok(doc) => {
            let pages = doc.get_pages().len();
            debug!("validated '{}': {} pages", path.display(), pages);
            pages > 0
        }
        Err(e) => {
            debug!("'{}' is not a valid PDF: {e}", path.display());
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Smallest well-formed one-page PDF that lopdf will open.
    pub(crate) const MINIMAL_PDF: &[u8] = b"%PDF-1.4\n\
1 0 obj\n<< /Type /Catalog /Pages 2 0 R >>\nendobj\n\
2 0 obj\n<< /Type /Pages /Kids [3 0 R] /Count 1 >>\nendobj\n\
3 0 obj\n<< /Type /Page /Parent 2 0 R /MediaBox [0 0 595 842] >>\nendobj\n\
xref\n0 4\n\
0000000000 65535 f \n\
0000000009 00000 n \n\
0000000058 00000 n \n\
0000000115 00000 n \n\
trailer\n<< /Size 4 /Root 1 0 R >>\nstartxref\n186\n%%EOF\n";

    #[test]
    fn minimal_pdf_validates() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(MINIMAL_PDF).unwrap();
        f.flush().unwrap();
        assert!(is_valid_pdf(f.path()));
    }

    #[test]
    fn garbage_does_not_validate() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"this is not a pdf at all").unwrap();
        f.flush().unwrap();
        assert!(!is_valid_pdf(f.path()));
    }

    #[test]
    fn missing_file_does_not_validate() {
        assert!(!is_valid_pdf(Path::new("/nonexistent/output.pdf")));
    }
}
