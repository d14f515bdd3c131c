//! Result types returned by the conversion entry points.
//!
//! A single job yields a [`ConversionOutcome`]; a batch yields one
//! [`JobReport`] per input collected into a [`BatchSummary`]. Everything
//! here is serde-serialisable so the CLI can emit it with `--json`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How a single conversion job ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    /// The pipeline ran end to end and the output PDF validated.
    Converted,
    /// The output already existed and validated as a PDF; no rendering
    /// was performed (idempotent re-run, see
    /// [`crate::config::ConversionConfig::skip_existing`]).
    SkippedUpToDate,
}

/// Outcome of one successful conversion job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutcome {
    /// Whether the job rendered or was skipped as already complete.
    pub status: JobStatus,
    /// The output PDF path.
    pub output: PathBuf,
    /// Path of the self-contained HTML byproduct, when one was kept.
    pub html_artifact: Option<PathBuf>,
    /// Pipeline statistics.
    pub stats: ConversionStats,
}

/// Statistics for one conversion job.
///
/// A skipped job reports zeroed stage timings and counts.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Resources recovered from the archive and inlined as data URIs.
    pub inlined_resources: usize,
    /// Resources dropped for non-fatal reasons (bad base64, no
    /// Content-Location). Their references stay unresolved in the output.
    pub dropped_resources: usize,
    /// Byte length of the final self-contained HTML.
    pub html_bytes: usize,
    /// Time spent decomposing the archive and rebuilding the HTML.
    pub pipeline_duration_ms: u64,
    /// Time spent inside the external rendering engine.
    pub render_duration_ms: u64,
    /// Wall-clock time for the whole job.
    pub total_duration_ms: u64,
}

/// Per-input record collected by a batch run.
///
/// The error is flattened to its display string so a `JobReport` stays
/// serialisable and the report is decoupled from the error enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobReport {
    /// The input archive.
    pub input: PathBuf,
    /// The target PDF path.
    pub output: PathBuf,
    /// `Ok(status)` or the job's fatal error message.
    pub result: Result<JobStatus, String>,
}

impl JobReport {
    /// Whether this job ended successfully (converted or skipped).
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Aggregate result of a batch run.
///
/// A batch succeeds only if every job succeeded; failed jobs never roll
/// back the outputs that sibling jobs already produced.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchSummary {
    /// One report per discovered input, in completion order.
    pub jobs: Vec<JobReport>,
    /// Wall-clock time for the whole batch.
    pub total_duration_ms: u64,
}

impl BatchSummary {
    /// Count of jobs that converted or were skipped as up to date.
    pub fn succeeded(&self) -> usize {
        self.jobs.iter().filter(|j| j.succeeded()).count()
    }

    /// Count of jobs that failed.
    pub fn failed(&self) -> usize {
        self.jobs.len() - self.succeeded()
    }

    /// All-or-nothing batch status: true only when every job succeeded.
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(ok: bool) -> JobReport {
        JobReport {
            input: PathBuf::from("a.mht"),
            output: PathBuf::from("a.pdf"),
            result: if ok {
                Ok(JobStatus::Converted)
            } else {
                Err("render failed".into())
            },
        }
    }

    #[test]
    fn batch_all_succeeded() {
        let summary = BatchSummary {
            jobs: vec![report(true), report(true)],
            total_duration_ms: 10,
        };
        assert!(summary.all_succeeded());
        assert_eq!(summary.succeeded(), 2);
        assert_eq!(summary.failed(), 0);
    }

    #[test]
    fn batch_partial_failure_is_not_success() {
        let summary = BatchSummary {
            jobs: vec![report(true), report(false), report(true)],
            total_duration_ms: 10,
        };
        assert!(!summary.all_succeeded());
        assert_eq!(summary.failed(), 1);
    }

    #[test]
    fn outcome_serialises_to_json() {
        let outcome = ConversionOutcome {
            status: JobStatus::SkippedUpToDate,
            output: PathBuf::from("x.pdf"),
            html_artifact: None,
            stats: ConversionStats::default(),
        };
        let json = serde_json::to_string(&outcome).unwrap();
        assert!(json.contains("SkippedUpToDate"));
    }
}
