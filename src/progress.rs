//! Progress-callback trait for per-job batch events.
//!
//! Inject an [`Arc<dyn BatchProgressCallback>`] via
//! [`crate::config::ConversionConfigBuilder::progress_callback`] to receive
//! real-time events as the batch runner processes each input file.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a Tokio broadcast channel, a WebSocket, a database record,
//! or a terminal progress bar — without the library knowing anything about how
//! the host application communicates. The trait is `Send + Sync` because jobs
//! run concurrently on the worker pool.

use std::sync::Arc;

/// Called by the batch runner as it processes each conversion job.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
///
/// # Thread safety
///
/// `on_job_start`, `on_job_complete`, and `on_job_error` may be called
/// concurrently from different tasks. Implementations must protect shared
/// mutable state with appropriate synchronisation primitives.
pub trait BatchProgressCallback: Send + Sync {
    /// Called once before any job runs.
    fn on_batch_start(&self, total_jobs: usize) {
        let _ = total_jobs;
    }

    /// Called just before a job's pipeline begins.
    fn on_job_start(&self, input: &std::path::Path) {
        let _ = input;
    }

    /// Called when a job succeeds (converted or skipped as up to date).
    ///
    /// `skipped` is true when the existing output validated and no rendering
    /// was performed.
    fn on_job_complete(&self, input: &std::path::Path, skipped: bool) {
        let _ = (input, skipped);
    }

    /// Called when a job fails.
    fn on_job_error(&self, input: &std::path::Path, error: &str) {
        let _ = (input, error);
    }

    /// Called once after all jobs have been attempted.
    fn on_batch_complete(&self, total_jobs: usize, success_count: usize) {
        let _ = (total_jobs, success_count);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl BatchProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type ProgressCallback = Arc<dyn BatchProgressCallback>;
