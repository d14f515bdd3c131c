//! Rendering: self-contained HTML → PDF via an external engine.
//!
//! ## Why a trait boundary?
//!
//! Rasterising HTML is a solved problem owned by full browser engines; the
//! core pipeline must have zero compile-time dependency on any particular
//! one. [`RenderEngine`] is the single capability interface — an adapter
//! gets self-contained HTML and a destination path and either produces an
//! openable PDF there or fails. Tests substitute a stub; deployments pick
//! the Chromium adapter below or bring their own.
//!
//! ## Why a blocking trait?
//!
//! Rendering is one opaque external call with no useful intermediate
//! state. A plain blocking method keeps the trait object-safe and dumb;
//! the pipeline wraps calls in `tokio::task::spawn_blocking` so the async
//! workers never stall on a browser process.

use crate::config::ConversionConfig;
use crate::error::Mhtml2PdfError;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// The single rendering capability the pipeline depends on.
///
/// Contract: on `Ok(())` the destination holds a PDF whose pages can be
/// enumerated (the pipeline verifies with
/// [`crate::pipeline::validate::is_valid_pdf`]). Embedded data-URI images
/// and background colors must be reflected in the output; page size
/// defaults to a standard A4-equivalent unless the document's print CSS
/// says otherwise.
pub trait RenderEngine: Send + Sync {
    /// Render `html` into a PDF file at `dest`.
    fn render(&self, html: &str, dest: &Path) -> Result<(), Mhtml2PdfError>;
}

/// Headless-Chromium adapter: shells out to a local browser binary.
///
/// Each `render` call spawns a fresh browser process, so conversions never
/// share rendering state even when one `ChromiumRenderer` value is reused
/// across a whole batch.
pub struct ChromiumRenderer {
    binary: PathBuf,
    timeout: Duration,
}

/// Binary names probed on `PATH`, in preference order.
const CHROMIUM_CANDIDATES: [&str; 5] = [
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

impl ChromiumRenderer {
    /// Locate a Chromium binary and build a renderer with the configured
    /// timeout.
    ///
    /// Resolution order: explicit `config.chromium_path`, then the
    /// `MHTML2PDF_CHROMIUM` environment variable, then well-known binary
    /// names on `PATH`.
    pub fn discover(config: &ConversionConfig) -> Result<Self, Mhtml2PdfError> {
        let binary = if let Some(ref path) = config.chromium_path {
            if !path.is_file() {
                return Err(Mhtml2PdfError::ChromiumNotFound);
            }
            path.clone()
        } else if let Some(env_path) = std::env::var_os("MHTML2PDF_CHROMIUM") {
            let path = PathBuf::from(env_path);
            if !path.is_file() {
                return Err(Mhtml2PdfError::ChromiumNotFound);
            }
            path
        } else {
            CHROMIUM_CANDIDATES
                .iter()
                .find_map(|name| find_in_path(name))
                .ok_or(Mhtml2PdfError::ChromiumNotFound)?
        };

        info!("using Chromium binary: {}", binary.display());
        Ok(Self {
            binary,
            timeout: Duration::from_secs(config.render_timeout_secs),
        })
    }

    /// Build a renderer around a known binary (tests, exotic installs).
    pub fn with_binary(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

impl RenderEngine for ChromiumRenderer {
    fn render(&self, html: &str, dest: &Path) -> Result<(), Mhtml2PdfError> {
        if let Some(parent) = dest.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| Mhtml2PdfError::OutputWriteFailed {
                    path: dest.to_path_buf(),
                    source: e,
                })?;
            }
        }

        // Chromium wants a file:// URL with an .html extension; the scratch
        // file is deleted when `page` drops, crash or not.
        let mut page = tempfile::Builder::new()
            .prefix("mhtml2pdf-")
            .suffix(".html")
            .tempfile()
            .map_err(|e| Mhtml2PdfError::Internal(format!("scratch html: {e}")))?;
        page.write_all(html.as_bytes())
            .map_err(|e| Mhtml2PdfError::Internal(format!("scratch html write: {e}")))?;
        page.flush()
            .map_err(|e| Mhtml2PdfError::Internal(format!("scratch html flush: {e}")))?;

        let url = format!("file://{}", page.path().display());
        debug!("rendering {} → {}", url, dest.display());

        let mut child = Command::new(&self.binary)
            .arg("--headless")
            .arg("--disable-gpu")
            // Chromium refuses to start its sandbox when running as root
            // (common in containers).
            .arg("--no-sandbox")
            .arg("--no-pdf-header-footer")
            .arg(format!("--print-to-pdf={}", dest.display()))
            .arg(&url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| Mhtml2PdfError::RenderFailed {
                dest: dest.to_path_buf(),
                detail: format!("failed to spawn {}: {e}", self.binary.display()),
            })?;

        // Drain stderr on its own thread while we poll: a chatty engine
        // that fills the OS pipe buffer would otherwise block on the write
        // and never exit.
        let stderr_reader = child.stderr.take().map(|mut pipe| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = std::io::Read::read_to_string(&mut pipe, &mut buf);
                buf
            })
        });

        let status = wait_with_timeout(&mut child, self.timeout).map_err(|_| {
            let _ = child.kill();
            let _ = child.wait();
            Mhtml2PdfError::RenderTimeout {
                dest: dest.to_path_buf(),
                secs: self.timeout.as_secs(),
            }
        })?;

        if !status.success() {
            let stderr = stderr_reader
                .and_then(|reader| reader.join().ok())
                .unwrap_or_default();
            return Err(Mhtml2PdfError::RenderFailed {
                dest: dest.to_path_buf(),
                detail: format!("engine exited with {status}: {}", stderr.trim()),
            });
        }

        if !dest.is_file() {
            return Err(Mhtml2PdfError::RenderFailed {
                dest: dest.to_path_buf(),
                detail: "engine reported success but produced no file".into(),
            });
        }

        Ok(())
    }
}

/// Resolve the engine for a job: a caller-supplied one, else Chromium.
pub fn resolve_renderer(
    config: &ConversionConfig,
) -> Result<Arc<dyn RenderEngine>, Mhtml2PdfError> {
    if let Some(ref engine) = config.renderer {
        return Ok(Arc::clone(engine));
    }
    Ok(Arc::new(ChromiumRenderer::discover(config)?))
}

/// Poll a child process until it exits or the deadline passes.
///
/// `Err(())` means timeout; the caller kills the child.
fn wait_with_timeout(
    child: &mut std::process::Child,
    timeout: Duration,
) -> Result<std::process::ExitStatus, ()> {
    let deadline = Instant::now() + timeout;
    loop {
        match child.try_wait() {
            Ok(Some(status)) => return Ok(status),
            Ok(None) => {
                if Instant::now() >= deadline {
                    return Err(());
                }
                std::thread::sleep(Duration::from_millis(50));
            }
            Err(_) => return Err(()),
        }
    }
}

/// Locate an executable by name on `PATH`.
fn find_in_path(name: &str) -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_in_path_locates_sh() {
        // /bin/sh exists on every platform these tests run on.
        assert!(find_in_path("sh").is_some());
        assert!(find_in_path("definitely-not-a-real-binary-name").is_none());
    }

    #[test]
    fn discover_fails_on_bogus_explicit_path() {
        let config = ConversionConfig::builder()
            .chromium_path("/nonexistent/chromium")
            .build()
            .unwrap();
        assert!(matches!(
            ChromiumRenderer::discover(&config),
            Err(Mhtml2PdfError::ChromiumNotFound)
        ));
    }

    #[cfg(unix)]
    #[test]
    fn noisy_engine_stderr_does_not_wedge_the_render() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();

        // Fake engine: floods stderr well past the OS pipe buffer, still
        // writes the destination file and exits 0.
        let script = dir.path().join("engine.sh");
        std::fs::write(
            &script,
            "#!/bin/sh\n\
             head -c 1048576 /dev/zero | tr '\\0' 'x' >&2\n\
             for arg in \"$@\"; do\n\
               case \"$arg\" in\n\
                 --print-to-pdf=*) printf '%%PDF' > \"${arg#--print-to-pdf=}\" ;;\n\
               esac\n\
             done\n\
             exit 0\n",
        )
        .unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let renderer = ChromiumRenderer::with_binary(&script, Duration::from_secs(5));
        let dest = dir.path().join("out.pdf");
        // A wedged child would surface here as RenderTimeout after 5s.
        renderer.render("<html></html>", &dest).unwrap();
        assert!(dest.is_file());
    }

    #[cfg(unix)]
    #[test]
    fn failing_engine_stderr_is_reported() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("engine.sh");
        std::fs::write(&script, "#!/bin/sh\necho 'gpu init failed' >&2\nexit 3\n").unwrap();
        std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

        let renderer = ChromiumRenderer::with_binary(&script, Duration::from_secs(5));
        let err = renderer
            .render("<html></html>", &dir.path().join("out.pdf"))
            .unwrap_err();
        match err {
            Mhtml2PdfError::RenderFailed { detail, .. } => {
                assert!(detail.contains("gpu init failed"), "got: {detail}");
            }
            other => panic!("expected RenderFailed, got {other:?}"),
        }
    }

    #[test]
    fn renderer_fails_cleanly_when_binary_cannot_spawn() {
        let renderer =
            ChromiumRenderer::with_binary("/nonexistent/chromium", Duration::from_secs(5));
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("out.pdf");
        let err = renderer.render("<html></html>", &dest).unwrap_err();
        assert!(matches!(err, Mhtml2PdfError::RenderFailed { .. }));
    }
}
