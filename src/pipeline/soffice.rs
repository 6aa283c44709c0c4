//! External renderer invocation: source document → PDF via headless LibreOffice.
//!
//! ## Why a sub-process?
//!
//! LibreOffice is the only renderer that handles the full zoo of presentation
//! formats (.pptx, .ppt, .odp, .key exports) with reasonable fidelity, and it
//! only exists as an external program. The command shape is the stable,
//! documented batch interface:
//!
//! ```text
//! soffice --headless --convert-to pdf --outdir <out> <source>
//! ```
//!
//! ## Why an isolated user profile?
//!
//! soffice instances sharing the default user profile lock each other out —
//! a second concurrent conversion silently attaches to the first instance and
//! exits without converting anything. Each run therefore gets a throwaway
//! profile directory via `-env:UserInstallation=file://…`, removed when the
//! run ends.
//!
//! ## Why a timeout?
//!
//! LibreOffice hangs rather than exits on certain malformed documents. The
//! wait is bounded by `render_timeout_secs`; on expiry the child is killed
//! (`kill_on_drop`) and the run fails with a distinct timeout error so
//! callers can tell "renderer is stuck" from "renderer rejected the file".

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use office_locate::locate_soffice;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tempfile::TempDir;
use tokio::process::Command;
use tokio::time::{timeout, Duration};
use tracing::{debug, info, warn};

/// The PDF path the renderer will produce for `source` under `out_root`.
///
/// LibreOffice names its output after the source file's stem:
/// `deck.pptx → <out_root>/deck.pdf`.
pub fn pdf_destination(source: &Path, out_root: &Path) -> PathBuf {
    let stem = source.file_stem().unwrap_or_default();
    out_root.join(format!("{}.pdf", stem.to_string_lossy()))
}

/// Format a filesystem path as the `file:///…` URL soffice expects for
/// `-env:UserInstallation`.
fn profile_url(path: &Path) -> String {
    let normalized = path.to_string_lossy().replace('\\', "/");
    format!("file:///{}", normalized.trim_start_matches('/'))
}

/// Convert `source` to PDF in `out_root` by driving the external renderer.
///
/// Blocks (asynchronously) until the renderer exits or the configured
/// timeout expires. Success requires both a success exit status **and** the
/// expected PDF existing afterwards — LibreOffice is known to exit 0 while
/// producing nothing for formats it does not understand.
///
/// # Returns
/// The path to the produced PDF, `<out_root>/<stem>.pdf`.
pub async fn render_to_pdf(
    source: &Path,
    out_root: &Path,
    config: &ConversionConfig,
) -> Result<PathBuf, ConvertError> {
    let soffice = locate_soffice(config.soffice_path.as_deref())
        .map_err(|e| ConvertError::RendererNotFound(e.to_string()))?;
    debug!("Using renderer: {}", soffice.display());

    let profile_dir = TempDir::new()
        .map_err(|e| ConvertError::Internal(format!("Failed to create profile dir: {}", e)))?;

    let mut cmd = Command::new(&soffice);
    cmd.arg(format!(
        "-env:UserInstallation={}",
        profile_url(profile_dir.path())
    ))
    .arg("--headless")
    .arg("--convert-to")
    .arg("pdf")
    .arg("--outdir")
    .arg(out_root)
    .arg(source)
    .stdin(Stdio::null())
    .stdout(Stdio::piped())
    .stderr(Stdio::piped())
    .kill_on_drop(true);

    info!(
        "Renderer command: {} --headless --convert-to pdf --outdir {} {}",
        soffice.display(),
        out_root.display(),
        source.display()
    );

    let child = cmd.spawn().map_err(|e| ConvertError::RendererSpawnFailed {
        path: soffice.clone(),
        source: e,
    })?;

    let secs = config.render_timeout_secs;
    let output = match timeout(Duration::from_secs(secs), child.wait_with_output()).await {
        Ok(waited) => waited
            .map_err(|e| ConvertError::Internal(format!("Failed to wait on renderer: {}", e)))?,
        Err(_) => {
            // Dropping the future drops the child; kill_on_drop reaps it.
            warn!("Renderer exceeded {}s; killing process", secs);
            return Err(ConvertError::RendererTimedOut { secs });
        }
    };

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stdout.trim().is_empty() {
        debug!("Renderer stdout: {}", stdout.trim());
    }
    if !stderr.trim().is_empty() {
        debug!("Renderer stderr: {}", stderr.trim());
    }

    if !output.status.success() {
        let detail = if stderr.trim().is_empty() {
            stdout.trim().to_string()
        } else {
            stderr.trim().to_string()
        };
        return Err(ConvertError::RendererFailed {
            status: output.status.to_string(),
            stderr: detail,
        });
    }

    let pdf_path = pdf_destination(source, out_root);
    if !pdf_path.exists() {
        return Err(ConvertError::PdfMissing { path: pdf_path });
    }

    info!("PDF created: {}", pdf_path.display());
    Ok(pdf_path)
}
