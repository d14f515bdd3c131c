//! # mhtml2pdf
//!
//! Convert MHTML/MHT web archives (and `.doc` files that are really
//! single-file web pages) to PDF.
//!
//! ## Why this crate?
//!
//! MHTML bundles an HTML document and its resources into one email-style
//! multipart file. Rendering engines will not open it directly, and naive
//! extraction leaves quoted-printable artifacts (`=3D`, soft line breaks),
//! Office markup islands, and image references pointing at parts that no
//! longer exist as files. This crate decomposes the archive, repairs the
//! HTML, inlines every recoverable resource as a data URI, and only then
//! hands a self-contained document to a rendering engine.
//!
//! ## Pipeline Overview
//!
//! ```text
//! archive (.mhtml / .mht / .doc)
//!  │
//!  ├─ 1. Archive   walk the multipart tree → HTML part + resource map
//!  ├─ 2. Normalize undo quoted-printable artifacts, strip Office noise
//!  ├─ 3. Inline    rewrite src / data-image-src references as data URIs
//!  ├─ 4. Render    headless Chromium (or any RenderEngine) → PDF
//!  └─ 5. Validate  open the PDF and enumerate its pages
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mhtml2pdf::{convert_to_file, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let outcome = convert_to_file("snapshot.mhtml", "snapshot.pdf", &config).await?;
//!     eprintln!("{} resources inlined, {}ms",
//!         outcome.stats.inlined_resources,
//!         outcome.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! Re-runs are idempotent by default: an output that already validates as
//! a PDF is skipped without touching the renderer. Set
//! `skip_existing(false)` to always re-render.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `mhtml2pdf` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only
//! deps:
//! ```toml
//! mhtml2pdf = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod batch;
pub mod config;
pub mod convert;
pub mod error;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use batch::{convert_batch, discover_inputs};
pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{build_document, convert_to_file, convert_to_file_sync, DocumentBuild};
pub use error::{Mhtml2PdfError, ResourceError};
pub use output::{BatchSummary, ConversionOutcome, ConversionStats, JobReport, JobStatus};
pub use pipeline::render::{ChromiumRenderer, RenderEngine};
pub use progress::{BatchProgressCallback, NoopProgressCallback, ProgressCallback};
