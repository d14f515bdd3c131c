//! Error types for the mhtml2pdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Mhtml2PdfError`] — **Fatal for one job**: the conversion of a single
//!   input cannot proceed (no HTML part in the archive, renderer crashed,
//!   output not writable). Returned as `Err(Mhtml2PdfError)` from the
//!   top-level `convert*` functions. In a batch, a job's fatal error never
//!   aborts sibling jobs — it is caught at the job boundary and recorded in
//!   a [`crate::output::JobReport`].
//!
//! * [`ResourceError`] — **Non-fatal**: a single embedded resource could not
//!   be recovered (malformed base64, no Content-Location to key it by). The
//!   resource is dropped and its reference in the HTML is simply left
//!   unresolved, producing a broken image rather than a failed conversion.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the mhtml2pdf library.
///
/// Resource-level failures use [`ResourceError`] and are logged and counted
/// in [`crate::output::ConversionStats`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Mhtml2PdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("input file not found: '{}'\nCheck the path exists and is readable.", path.display())]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("permission denied reading '{}'\nTry: chmod +r '{}'", path.display(), path.display())]
    PermissionDenied { path: PathBuf },

    /// The input extension is not one of `.mhtml`, `.mht`, `.doc`.
    #[error("unsupported input extension for '{}': expected .mhtml, .mht, or .doc", path.display())]
    UnsupportedExtension { path: PathBuf },

    // ── Archive errors ────────────────────────────────────────────────────
    /// The bytes could not be parsed as a MIME multipart archive at all.
    #[error("'{}' is not a parseable MHTML archive", path.display())]
    ArchiveParseFailed { path: PathBuf },

    /// The archive was parsed but contains no `text/html` part.
    ///
    /// Zero HTML parts means there is nothing to render; this is a format
    /// error for the job, never silently skipped.
    #[error("archive '{}' contains no text/html part", path.display())]
    MissingHtmlPart { path: PathBuf },

    /// A `text/html` part exists but its payload is not valid UTF-8 text.
    #[error("HTML part of '{}' could not be decoded as UTF-8: {detail}", path.display())]
    HtmlDecodeFailed { path: PathBuf, detail: String },

    /// The normalizer received empty or whitespace-only HTML.
    #[error("no HTML content to normalize (input was empty)")]
    EmptyHtml,

    // ── Render errors ─────────────────────────────────────────────────────
    /// No Chromium/Chrome binary could be located.
    #[error(
        "no Chromium binary found.\n\
         Install chromium or google-chrome, or point MHTML2PDF_CHROMIUM \
         (or --chromium) at an existing binary."
    )]
    ChromiumNotFound,

    /// The external rendering engine failed to produce a valid PDF.
    #[error("rendering failed for '{}': {detail}", dest.display())]
    RenderFailed { dest: PathBuf, detail: String },

    /// The render call exceeded the configured timeout.
    #[error("rendering timed out after {secs}s for '{}'\nIncrease --render-timeout.", dest.display())]
    RenderTimeout { dest: PathBuf, secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output file (PDF or `.html` byproduct).
    #[error("failed to write output file '{}': {source}", path.display())]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single embedded resource.
///
/// The Archive Parser drops the offending resource, logs the error, and
/// carries on; the HTML reference to it stays untouched (broken image).
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ResourceError {
    /// The part's payload was declared base64 but failed to decode.
    #[error("resource '{location}': malformed base64 payload: {detail}")]
    Base64Decode { location: String, detail: String },

    /// The part carries no Content-Location, so nothing can reference it.
    #[error("resource of type '{content_type}' has no Content-Location; dropped")]
    MissingLocation { content_type: String },
}
