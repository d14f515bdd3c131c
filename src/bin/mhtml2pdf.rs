//! CLI binary for mhtml2pdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints per-file results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use mhtml2pdf::{
    convert_batch, convert_to_file, discover_inputs, BatchProgressCallback, ConversionConfig,
    JobStatus,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-file log
/// lines using [indicatif]. `ProgressBar` is internally synchronised, so
/// out-of-order completion on the worker pool needs no extra state.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new(total: usize) -> Arc<Self> {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_job_start(&self, input: &Path) {
        self.bar.set_message(input.display().to_string());
    }

    fn on_job_complete(&self, input: &Path, skipped: bool) {
        let note = if skipped {
            dim("already converted, skipped")
        } else {
            String::new()
        };
        self.bar
            .println(format!("  {} {}  {note}", green("✓"), input.display()));
        self.bar.inc(1);
    }

    fn on_job_error(&self, input: &Path, error: &str) {
        // Keep the log line to one row.
        let msg = error.lines().next().unwrap_or(error);
        self.bar
            .println(format!("  {} {}  {}", red("✗"), input.display(), red(msg)));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_jobs: usize, success_count: usize) {
        let failed = total_jobs.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} files converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} files converted  ({} failed)",
                if failed == total_jobs {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_jobs,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Single file
  mhtml2pdf snapshot.mhtml snapshot.pdf

  # Whole directory (recursive), flattened into ./pdfs
  mhtml2pdf ./archive ./pdfs

  # Always re-render, keep the intermediate HTML for inspection
  mhtml2pdf --overwrite --keep-html page.mht page.pdf

  # Explicit browser binary, 4 workers
  mhtml2pdf --chromium /usr/bin/chromium -w 4 ./archive ./pdfs

  # Machine-readable batch report
  mhtml2pdf --json ./archive ./pdfs > report.json

IDEMPOTENT RE-RUNS:
  By default an output that already exists and validates as a PDF is
  treated as complete and skipped. --overwrite always re-renders.

ENVIRONMENT VARIABLES:
  MHTML2PDF_CHROMIUM   Path to a Chromium/Chrome binary
  MHTML2PDF_WORKERS    Worker-pool size (default: core count)
"#;

/// Convert MHTML/MHT web archives to PDF via headless Chromium.
#[derive(Parser, Debug)]
#[command(
    name = "mhtml2pdf",
    version,
    about = "Convert MHTML/MHT web archives to PDF via headless Chromium",
    long_about = "Convert single-file web archives (.mhtml, .mht, and .doc files saved as \
single-file web pages) to PDF. Accepts a single file or a directory tree; directory \
outputs are flattened into one target directory.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Input archive file or directory to scan recursively.
    input: PathBuf,

    /// Output PDF file (single-file mode) or output directory (batch mode).
    output: PathBuf,

    /// Number of concurrent conversion jobs.
    #[arg(short, long, env = "MHTML2PDF_WORKERS")]
    workers: Option<usize>,

    /// Always re-render, even when a valid output PDF already exists.
    #[arg(long, env = "MHTML2PDF_OVERWRITE")]
    overwrite: bool,

    /// Keep the intermediate self-contained HTML next to each PDF.
    #[arg(long, env = "MHTML2PDF_KEEP_HTML")]
    keep_html: bool,

    /// Path to a Chromium/Chrome binary.
    #[arg(long, env = "MHTML2PDF_CHROMIUM")]
    chromium: Option<PathBuf>,

    /// Per-file rendering timeout in seconds.
    #[arg(long, env = "MHTML2PDF_RENDER_TIMEOUT", default_value_t = 120)]
    render_timeout: u64,

    /// Output a structured JSON report instead of log lines.
    #[arg(long, env = "MHTML2PDF_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "MHTML2PDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MHTML2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MHTML2PDF_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json && cli.input.is_dir();
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let mut builder = ConversionConfig::builder()
        .skip_existing(!cli.overwrite)
        .keep_html(cli.keep_html)
        .render_timeout_secs(cli.render_timeout);
    if let Some(workers) = cli.workers {
        builder = builder.workers(workers);
    }
    if let Some(ref chromium) = cli.chromium {
        builder = builder.chromium_path(chromium);
    }

    if cli.input.is_dir() {
        // ── Batch mode ───────────────────────────────────────────────────
        let inputs = discover_inputs(&cli.input).context("failed to scan input directory")?;
        if inputs.is_empty() {
            anyhow::bail!(
                "no .mhtml, .mht, or .doc files found under '{}'",
                cli.input.display()
            );
        }

        if show_progress {
            builder = builder.progress_callback(CliProgressCallback::new(inputs.len()));
        }
        let config = builder.build().context("invalid configuration")?;

        let summary = convert_batch(&inputs, &cli.output, &config)
            .await
            .context("batch conversion failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&summary).context("failed to serialise summary")?
            );
        } else if !cli.quiet && !show_progress {
            for job in &summary.jobs {
                match &job.result {
                    Ok(JobStatus::Converted) => {
                        eprintln!("{} {}", green("✓"), job.input.display())
                    }
                    Ok(JobStatus::SkippedUpToDate) => eprintln!(
                        "{} {}  {}",
                        green("✓"),
                        job.input.display(),
                        dim("skipped")
                    ),
                    Err(e) => eprintln!("{} {}  {}", red("✗"), job.input.display(), red(e)),
                }
            }
        }

        if !summary.all_succeeded() {
            anyhow::bail!(
                "{} of {} files failed to convert",
                summary.failed(),
                summary.jobs.len()
            );
        }
    } else {
        // ── Single-file mode ─────────────────────────────────────────────
        let config = builder.build().context("invalid configuration")?;
        let outcome = convert_to_file(&cli.input, &cli.output, &config)
            .await
            .with_context(|| format!("failed to convert '{}'", cli.input.display()))?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome).context("failed to serialise outcome")?
            );
        } else if !cli.quiet {
            match outcome.status {
                JobStatus::Converted => eprintln!(
                    "{} {}  {}",
                    green("✔"),
                    bold(&outcome.output.display().to_string()),
                    dim(&format!(
                        "{} resources, {}ms",
                        outcome.stats.inlined_resources, outcome.stats.total_duration_ms
                    )),
                ),
                JobStatus::SkippedUpToDate => eprintln!(
                    "{} {}  {}",
                    green("✔"),
                    bold(&outcome.output.display().to_string()),
                    dim("already a valid PDF, skipped"),
                ),
            }
        }
    }

    Ok(())
}
