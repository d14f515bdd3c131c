//! Single-job conversion entry points.
//!
//! One job = one input archive → one output PDF. The in-memory core
//! (decompose, normalize, inline) is exposed separately as
//! [`build_document`] for callers that bring their own renderer; the full
//! job including rendering and acceptance validation is
//! [`convert_to_file`]. Batch fan-out lives in [`crate::batch`].

use crate::config::ConversionConfig;
use crate::error::Mhtml2PdfError;
use crate::output::{ConversionOutcome, ConversionStats, JobStatus};
use crate::pipeline::{archive, inline, normalize, render, validate};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Input extensions the converter accepts, lower-case.
const SUPPORTED_EXTENSIONS: [&str; 3] = ["mhtml", "mht", "doc"];

/// Whether `path` carries a supported archive extension
/// (case-insensitive).
pub fn is_supported_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
}

/// The self-contained document produced by the in-memory pipeline core.
#[derive(Debug)]
pub struct DocumentBuild {
    /// Final HTML with every resolvable resource inlined as a data URI.
    pub html: String,
    /// Resources recovered from the archive.
    pub inlined_resources: usize,
    /// Resources dropped for non-fatal reasons.
    pub dropped_resources: usize,
}

/// Run the in-memory pipeline core: archive bytes → self-contained HTML.
///
/// `origin` is used only for error context. This is the seam for callers
/// with their own rendering arrangements; no file system access happens
/// here.
///
/// # Errors
/// Format errors ([`Mhtml2PdfError::ArchiveParseFailed`],
/// [`Mhtml2PdfError::MissingHtmlPart`], [`Mhtml2PdfError::HtmlDecodeFailed`],
/// [`Mhtml2PdfError::EmptyHtml`]) are fatal for the job.
pub fn build_document(bytes: &[u8], origin: &Path) -> Result<DocumentBuild, Mhtml2PdfError> {
    let extracted = archive::parse_archive(bytes, origin)?;

    let raw_html = extracted
        .html
        .ok_or_else(|| Mhtml2PdfError::MissingHtmlPart {
            path: origin.to_path_buf(),
        })?;

    let cleaned = normalize::clean_html(&raw_html)?;
    let html = inline::inline_resources(&cleaned, &extracted.resources);

    debug!(
        "built document from '{}': {} bytes, {} resources inlined, {} dropped",
        origin.display(),
        html.len(),
        extracted.resources.len(),
        extracted.dropped_resources
    );

    Ok(DocumentBuild {
        html,
        inlined_resources: extracted.resources.len(),
        dropped_resources: extracted.dropped_resources,
    })
}

/// Convert one archive file to a PDF at `output`.
///
/// # Behaviour
/// * Unsupported extensions fail before any I/O.
/// * With `config.skip_existing`, an output that already validates as a
///   PDF short-circuits the job as [`JobStatus::SkippedUpToDate`] — the
///   renderer is never invoked.
/// * With `config.keep_html`, the self-contained HTML is persisted next to
///   the PDF (same base path, `.html` suffix) before rendering.
/// * A render only counts once the produced file passes the PDF
///   acceptance check.
pub async fn convert_to_file(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutcome, Mhtml2PdfError> {
    let total_start = Instant::now();
    let input = input.as_ref().to_path_buf();
    let output = output.as_ref().to_path_buf();
    info!("converting '{}' → '{}'", input.display(), output.display());

    if !is_supported_extension(&input) {
        return Err(Mhtml2PdfError::UnsupportedExtension { path: input });
    }

    // ── Idempotent re-run check ──────────────────────────────────────────
    if config.skip_existing && output.exists() {
        let probe = output.clone();
        let valid = tokio::task::spawn_blocking(move || validate::is_valid_pdf(&probe))
            .await
            .map_err(|e| Mhtml2PdfError::Internal(format!("validate task panicked: {e}")))?;
        if valid {
            info!(
                "skipping '{}': output already a valid PDF",
                input.display()
            );
            return Ok(ConversionOutcome {
                status: JobStatus::SkippedUpToDate,
                output,
                html_artifact: None,
                stats: ConversionStats {
                    total_duration_ms: total_start.elapsed().as_millis() as u64,
                    ..ConversionStats::default()
                },
            });
        }
        // Exists but corrupt: treat as not yet converted and overwrite.
        debug!("existing '{}' failed validation; re-rendering", output.display());
    }

    // ── Read + in-memory core ────────────────────────────────────────────
    let pipeline_start = Instant::now();
    let bytes = tokio::fs::read(&input).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Mhtml2PdfError::FileNotFound {
            path: input.clone(),
        },
        std::io::ErrorKind::PermissionDenied => Mhtml2PdfError::PermissionDenied {
            path: input.clone(),
        },
        _ => Mhtml2PdfError::Internal(format!("reading '{}': {e}", input.display())),
    })?;

    let origin = input.clone();
    let build = tokio::task::spawn_blocking(move || build_document(&bytes, &origin))
        .await
        .map_err(|e| Mhtml2PdfError::Internal(format!("pipeline task panicked: {e}")))??;
    let pipeline_duration_ms = pipeline_start.elapsed().as_millis() as u64;

    // ── Optional .html byproduct ─────────────────────────────────────────
    let html_artifact = if config.keep_html {
        let artifact = output.with_extension("html");
        if let Some(parent) = artifact.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Mhtml2PdfError::OutputWriteFailed {
                        path: artifact.clone(),
                        source: e,
                    }
                })?;
            }
        }
        tokio::fs::write(&artifact, &build.html).await.map_err(|e| {
            Mhtml2PdfError::OutputWriteFailed {
                path: artifact.clone(),
                source: e,
            }
        })?;
        Some(artifact)
    } else {
        None
    };

    // ── Render + acceptance check ────────────────────────────────────────
    let render_start = Instant::now();
    let engine = render::resolve_renderer(config)?;
    let dest = output.clone();
    let html = build.html.clone();
    tokio::task::spawn_blocking(move || engine.render(&html, &dest))
        .await
        .map_err(|e| Mhtml2PdfError::Internal(format!("render task panicked: {e}")))??;

    let probe = output.clone();
    let valid = tokio::task::spawn_blocking(move || validate::is_valid_pdf(&probe))
        .await
        .map_err(|e| Mhtml2PdfError::Internal(format!("validate task panicked: {e}")))?;
    if !valid {
        return Err(Mhtml2PdfError::RenderFailed {
            dest: output,
            detail: "produced file failed PDF validation".into(),
        });
    }
    let render_duration_ms = render_start.elapsed().as_millis() as u64;

    let stats = ConversionStats {
        inlined_resources: build.inlined_resources,
        dropped_resources: build.dropped_resources,
        html_bytes: build.html.len(),
        pipeline_duration_ms,
        render_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };
    info!(
        "converted '{}' in {}ms ({} resources inlined)",
        input.display(),
        stats.total_duration_ms,
        stats.inlined_resources
    );

    Ok(ConversionOutcome {
        status: JobStatus::Converted,
        output,
        html_artifact,
        stats,
    })
}

/// Synchronous wrapper around [`convert_to_file`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_to_file_sync(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutcome, Mhtml2PdfError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Mhtml2PdfError::Internal(format!("failed to create tokio runtime: {e}")))?
        .block_on(convert_to_file(input, output, config))
}

/// Derive the output PDF path for an input archive.
///
/// Batch mode flattens into `output_dir` (collisions between same-named
/// files in different subdirectories: last writer wins).
pub fn output_path_for(input: &Path, output_dir: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    output_dir.join(stem).with_extension("pdf")
}
