//! Eager (full-document) conversion entry points.
//!
//! [`convert`] drives the whole pipeline for one document: output root →
//! source validation → external render to PDF → per-page rasterisation.
//! Every step is strictly sequential and the first failure aborts the run;
//! there are no retries and nothing is cleaned up on failure (files already
//! written stay where they are, matching what a re-run would overwrite).

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::{input, rasterize, soffice};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// Convert a presentation document into per-page previews and thumbnails.
///
/// This is the primary entry point for the library.
///
/// # Arguments
/// * `source`   — Path to the presentation document (any format the
///   renderer understands: .pptx, .ppt, .odp, …)
/// * `out_root` — Directory receiving `<stem>.pdf`, `previews/`, and
///   `thumbnails/`; created if absent
/// * `config`   — Conversion configuration
///
/// # Returns
/// `Ok(ConversionOutput)` with the wire-format result, the intermediate PDF
/// path, and timing stats.
///
/// # Errors
/// Returns `Err(ConvertError)` on the first failing step: missing source,
/// renderer failure or timeout, missing PDF, rasterisation or write failure.
pub async fn convert(
    source: impl AsRef<Path>,
    out_root: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    let total_start = Instant::now();
    let source = source.as_ref();
    let out_root = out_root.as_ref();
    info!("Starting conversion: {}", source.display());

    // ── Step 1: Prepare output root ──────────────────────────────────────
    input::ensure_output_root(out_root).await?;

    // ── Step 2: Validate source document ─────────────────────────────────
    let source = input::validate_source(source)?;

    // ── Step 3: Render to PDF via the external renderer ──────────────────
    let render_start = Instant::now();
    let pdf_path = soffice::render_to_pdf(&source, out_root, config).await?;
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    info!("Rendered PDF in {}ms", render_duration_ms);

    if let Some(ref cb) = config.progress_callback {
        cb.on_pdf_ready(&pdf_path);
    }

    // ── Step 4: Rasterise pages, write previews and thumbnails ───────────
    let rasterise_start = Instant::now();
    let result = rasterize::rasterize_document(&pdf_path, out_root, config).await?;
    let rasterise_duration_ms = rasterise_start.elapsed().as_millis() as u64;

    // ── Step 5: Assemble stats ───────────────────────────────────────────
    let stats = ConversionStats {
        page_count: result.page_count,
        render_duration_ms,
        rasterise_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} pages, {}ms total",
        stats.page_count, stats.total_duration_ms
    );

    Ok(ConversionOutput {
        result,
        pdf_path,
        stats,
    })
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    source: impl AsRef<Path>,
    out_root: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, ConvertError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| ConvertError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(source, out_root, config))
}
