//! Batch execution: discover inputs, fan out over a worker pool, collect
//! per-job reports.
//!
//! Jobs are fully independent — each opens its own input and writes its
//! own output path — so the pool is plain bounded task-parallelism
//! (`buffer_unordered`), no shared mutable state and no core-pipeline
//! concurrency primitives. Every job's error is caught at the job boundary
//! and becomes a [`JobReport`]; a failing job never aborts its siblings and
//! partial outputs are kept, not rolled back.

use crate::config::ConversionConfig;
use crate::convert::{self, output_path_for};
use crate::error::Mhtml2PdfError;
use crate::output::{BatchSummary, JobReport, JobStatus};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, warn};
use walkdir::WalkDir;

/// Collect conversion inputs from a file or directory.
///
/// A directory is scanned recursively for the three supported extensions;
/// a single file is returned as-is (the extension gate runs inside the
/// job so single-file mode reports `UnsupportedExtension` through the
/// normal error path). Results are sorted for deterministic job order.
pub fn discover_inputs(path: &Path) -> Result<Vec<PathBuf>, Mhtml2PdfError> {
    if !path.exists() {
        return Err(Mhtml2PdfError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    if path.is_file() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut inputs: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(e) if e.file_type().is_file() => Some(e.into_path()),
            Ok(_) => None,
            Err(err) => {
                warn!("skipping unreadable directory entry: {err}");
                None
            }
        })
        .filter(|p| convert::is_supported_extension(p))
        .collect();
    inputs.sort();
    Ok(inputs)
}

/// Convert a batch of inputs into `output_dir`, flattened.
///
/// Outputs are named `<input stem>.pdf`; same-named inputs from different
/// subdirectories collide and the last writer wins. Concurrency is bounded
/// by `config.workers`.
pub async fn convert_batch(
    inputs: &[PathBuf],
    output_dir: &Path,
    config: &ConversionConfig,
) -> Result<BatchSummary, Mhtml2PdfError> {
    let batch_start = Instant::now();
    info!(
        "batch: {} inputs → '{}' ({} workers)",
        inputs.len(),
        output_dir.display(),
        config.workers
    );

    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(|e| Mhtml2PdfError::OutputWriteFailed {
            path: output_dir.to_path_buf(),
            source: e,
        })?;

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_start(inputs.len());
    }

    let jobs: Vec<JobReport> = stream::iter(inputs.iter().map(|input| {
        let input = input.clone();
        let output = output_path_for(&input, output_dir);
        let config = config.clone();
        async move {
            if let Some(ref cb) = config.progress_callback {
                cb.on_job_start(&input);
            }
            let result = convert::convert_to_file(&input, &output, &config).await;
            let report = match result {
                Ok(outcome) => {
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_job_complete(
                            &input,
                            outcome.status == JobStatus::SkippedUpToDate,
                        );
                    }
                    JobReport {
                        input,
                        output,
                        result: Ok(outcome.status),
                    }
                }
                Err(e) => {
                    let msg = e.to_string();
                    warn!("job failed for '{}': {msg}", input.display());
                    if let Some(ref cb) = config.progress_callback {
                        cb.on_job_error(&input, &msg);
                    }
                    JobReport {
                        input,
                        output,
                        result: Err(msg),
                    }
                }
            };
            report
        }
    }))
    .buffer_unordered(config.workers.max(1))
    .collect()
    .await;

    let summary = BatchSummary {
        total_duration_ms: batch_start.elapsed().as_millis() as u64,
        jobs,
    };

    if let Some(ref cb) = config.progress_callback {
        cb.on_batch_complete(summary.jobs.len(), summary.succeeded());
    }

    if summary.all_succeeded() {
        info!(
            "batch complete: {} jobs in {}ms",
            summary.jobs.len(),
            summary.total_duration_ms
        );
    } else {
        warn!(
            "batch finished with {}/{} failures",
            summary.failed(),
            summary.jobs.len()
        );
    }

    Ok(summary)
}
