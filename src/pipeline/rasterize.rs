//! PDF rasterisation: decode each page at the configured DPI and write its
//! preview and thumbnail.
//!
//! ## Why spawn_blocking?
//!
//! The `pdfium-render` crate wraps the pdfium C++ library, which uses
//! thread-local state internally and is not safe to call from async contexts.
//! `tokio::task::spawn_blocking` moves the work onto a dedicated thread pool
//! thread designed for blocking operations, preventing the Tokio worker
//! threads from stalling during CPU-heavy rendering.
//!
//! ## Why one page at a time?
//!
//! A 200-DPI render of a 16:9 slide is roughly a 2800 × 1575 px RGBA bitmap
//! (~17 MB). Decoding, encoding, and dropping each page inside its own loop
//! iteration keeps peak memory at one page regardless of document length.

use crate::config::ConversionConfig;
use crate::error::ConvertError;
use crate::output::ConversionResult;
use crate::pipeline::encode;
use pdfium_render::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Target pixel width for a page `width_pts` points wide rendered at `dpi`.
///
/// PDF points are 1/72 inch; pdfium derives the height from the page's
/// aspect ratio.
fn target_pixel_width(width_pts: f32, dpi: u32) -> i32 {
    ((width_pts * dpi as f32) / 72.0).round().max(1.0) as i32
}

/// Rasterise every page of `pdf_path` into `<out_root>/previews/` and
/// `<out_root>/thumbnails/`.
///
/// Pages are processed in document order, numbered from 1. The first page
/// failure aborts the run; files already written stay on disk.
///
/// # Returns
/// The wire-format [`ConversionResult`] listing every written path.
pub async fn rasterize_document(
    pdf_path: &Path,
    out_root: &Path,
    config: &ConversionConfig,
) -> Result<ConversionResult, ConvertError> {
    let pdf = pdf_path.to_path_buf();
    let root = out_root.to_path_buf();
    let config = config.clone();

    tokio::task::spawn_blocking(move || rasterize_blocking(&pdf, &root, &config))
        .await
        .map_err(|e| ConvertError::Internal(format!("Rasterise task panicked: {}", e)))?
}

/// Blocking implementation of the page loop.
fn rasterize_blocking(
    pdf_path: &Path,
    out_root: &Path,
    config: &ConversionConfig,
) -> Result<ConversionResult, ConvertError> {
    let pdfium = office_locate::bind_pdfium(config.pdfium_path.as_deref())
        .map_err(|e| ConvertError::PdfiumBindingFailed(e.to_string()))?;

    let document =
        pdfium
            .load_pdf_from_file(pdf_path, None)
            .map_err(|e| ConvertError::PdfOpenFailed {
                path: pdf_path.to_path_buf(),
                detail: format!("{:?}", e),
            })?;

    let pages = document.pages();
    let page_count = pages.len() as usize;
    info!("PDF loaded: {} pages", page_count);

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_start(page_count);
    }

    let previews_dir = out_root.join(encode::PREVIEWS_DIR);
    let thumbnails_dir = out_root.join(encode::THUMBNAILS_DIR);
    for dir in [&previews_dir, &thumbnails_dir] {
        std::fs::create_dir_all(dir).map_err(|e| ConvertError::OutputDirFailed {
            path: dir.clone(),
            source: e,
        })?;
    }

    let mut previews = Vec::with_capacity(page_count);
    let mut thumbnails = Vec::with_capacity(page_count);

    for idx in 0..page_count {
        let page_num = idx + 1;
        if let Some(ref cb) = config.progress_callback {
            cb.on_page_start(page_num, page_count);
        }

        match rasterize_page(&pages, idx, config, &previews_dir, &thumbnails_dir) {
            Ok((preview, thumbnail, preview_bytes)) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_complete(page_num, page_count, preview_bytes);
                }
                previews.push(preview);
                thumbnails.push(thumbnail);
            }
            Err(e) => {
                if let Some(ref cb) = config.progress_callback {
                    cb.on_page_error(page_num, page_count, &e.to_string());
                }
                return Err(e);
            }
        }
    }

    if let Some(ref cb) = config.progress_callback {
        cb.on_conversion_complete(page_count, previews.len());
    }

    Ok(ConversionResult {
        previews,
        thumbnails,
        page_count,
    })
}

/// Rasterise one page and write both of its output files.
///
/// The decoded bitmap lives only for this call.
fn rasterize_page(
    pages: &PdfPages<'_>,
    idx: usize,
    config: &ConversionConfig,
    previews_dir: &Path,
    thumbnails_dir: &Path,
) -> Result<(String, String, usize), ConvertError> {
    let page_num = idx + 1;

    let page = pages
        .get(idx as u16)
        .map_err(|e| ConvertError::RasterisationFailed {
            page: page_num,
            detail: format!("{:?}", e),
        })?;

    let target_width = target_pixel_width(page.width().value, config.dpi);
    let render_config = PdfRenderConfig::new().set_target_width(target_width);

    let bitmap =
        page.render_with_config(&render_config)
            .map_err(|e| ConvertError::RasterisationFailed {
                page: page_num,
                detail: format!("{:?}", e),
            })?;

    let image = encode::to_rgb(bitmap.as_image());
    debug!(
        "Rendered page {} → {}x{} px",
        page_num,
        image.width(),
        image.height()
    );

    let (preview_path, preview_bytes) =
        encode::write_preview(&image, previews_dir, page_num, config.preview_quality)?;
    let thumbnail_path = encode::write_thumbnail(
        &image,
        thumbnails_dir,
        page_num,
        config.thumbnail_quality,
        config.thumbnail_max_edge,
    )?;

    Ok((
        preview_path.display().to_string(),
        thumbnail_path.display().to_string(),
        preview_bytes,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_width_scales_points_by_dpi() {
        // 10-inch page (720 pt) at 200 DPI.
        assert_eq!(target_pixel_width(720.0, 200), 2000);
        // US Letter width (612 pt) at 200 DPI.
        assert_eq!(target_pixel_width(612.0, 200), 1700);
        // A4 width (595 pt) rounds rather than truncates.
        assert_eq!(target_pixel_width(595.0, 200), 1653);
    }

    #[test]
    fn target_width_is_at_least_one_pixel() {
        assert_eq!(target_pixel_width(0.0, 200), 1);
        assert_eq!(target_pixel_width(0.1, 72), 1);
    }
}
