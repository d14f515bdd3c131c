//! Configuration types for MHTML-to-PDF conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across a batch of jobs and to diff two runs to
//! understand why their outputs differ.
//!
//! # Design choice: builder over constructor
//! A many-field constructor is unreadable and breaks on every new field.
//! The builder pattern lets callers set only what they care about and rely on
//! well-documented defaults for the rest.

use crate::error::Mhtml2PdfError;
use crate::pipeline::render::RenderEngine;
use crate::progress::BatchProgressCallback;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for an MHTML-to-PDF conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use mhtml2pdf::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .workers(4)
///     .keep_html(true)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Skip jobs whose output already exists and validates as a PDF. Default: true.
    ///
    /// The check opens the existing file and enumerates its page tree; a
    /// corrupt or zero-page file counts as "not yet converted" and the job
    /// renders and overwrites it. Disable for integrations that must always
    /// re-render.
    pub skip_existing: bool,

    /// Keep the intermediate self-contained HTML next to the PDF. Default: false.
    ///
    /// The byproduct lands at the same base path with a `.html` suffix and is
    /// purely for debugging and inspection; correctness never depends on it.
    pub keep_html: bool,

    /// Number of concurrent jobs in a batch. Default: available core count.
    ///
    /// Each job is independent (own input handle, own output path, no shared
    /// mutable state), so the pool is plain task-parallelism with a bounded
    /// in-flight count. Rendering spawns one browser process per job; lower
    /// this on memory-constrained hosts.
    pub workers: usize,

    /// Per-job rendering timeout in seconds. Default: 120.
    ///
    /// The core pipeline imposes no timeout of its own on the external
    /// engine; this is the caller-imposed bound the render adapter enforces.
    pub render_timeout_secs: u64,

    /// Explicit path to a Chromium/Chrome binary.
    ///
    /// If None, `MHTML2PDF_CHROMIUM` is consulted, then a list of well-known
    /// binary names on `PATH`.
    pub chromium_path: Option<PathBuf>,

    /// Pre-constructed rendering engine. Takes precedence over
    /// `chromium_path`; lets tests substitute a stub and lets callers share
    /// one long-lived engine across sequential jobs.
    pub renderer: Option<Arc<dyn RenderEngine>>,

    /// Optional per-job progress events for batch runs.
    pub progress_callback: Option<Arc<dyn BatchProgressCallback>>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            skip_existing: true,
            keep_html: false,
            workers: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            render_timeout_secs: 120,
            chromium_path: None,
            renderer: None,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("skip_existing", &self.skip_existing)
            .field("keep_html", &self.keep_html)
            .field("workers", &self.workers)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field("chromium_path", &self.chromium_path)
            .field("renderer", &self.renderer.as_ref().map(|_| "<dyn RenderEngine>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn BatchProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn skip_existing(mut self, v: bool) -> Self {
        self.config.skip_existing = v;
        self
    }

    pub fn keep_html(mut self, v: bool) -> Self {
        self.config.keep_html = v;
        self
    }

    pub fn workers(mut self, n: usize) -> Self {
        self.config.workers = n.max(1);
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs;
        self
    }

    pub fn chromium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.chromium_path = Some(path.into());
        self
    }

    pub fn renderer(mut self, engine: Arc<dyn RenderEngine>) -> Self {
        self.config.renderer = Some(engine);
        self
    }

    pub fn progress_callback(mut self, cb: Arc<dyn BatchProgressCallback>) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Mhtml2PdfError> {
        let c = &self.config;
        if c.workers == 0 {
            return Err(Mhtml2PdfError::InvalidConfig("workers must be ≥ 1".into()));
        }
        if c.render_timeout_secs == 0 {
            return Err(Mhtml2PdfError::InvalidConfig(
                "render timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}
