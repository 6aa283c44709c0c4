//! JPEG encoding: normalise bitmaps to RGB and write preview/thumbnail files.
//!
//! ## Why normalise to RGB first?
//!
//! pdfium hands back RGBA bitmaps, and JPEG has no alpha channel — encoding
//! RGBA directly is a runtime error in the `image` crate. Flattening to 8-bit
//! RGB up front makes every later step total.
//!
//! ## Why temp-file + rename?
//!
//! A crash mid-write must not leave a half-written JPEG at the final path:
//! downstream consumers poll the output directory and would pick up the
//! truncated file. The rename is atomic on the same filesystem.

use crate::error::ConvertError;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ExtendedColorType};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory under the output root holding full-size previews.
pub const PREVIEWS_DIR: &str = "previews";

/// Directory under the output root holding thumbnails.
pub const THUMBNAILS_DIR: &str = "thumbnails";

/// Preview filename for a 1-indexed page number.
pub fn preview_filename(page_num: usize) -> String {
    format!("page-{}.jpg", page_num)
}

/// Thumbnail filename for a 1-indexed page number.
pub fn thumbnail_filename(page_num: usize) -> String {
    format!("page-{}-thumb.jpg", page_num)
}

/// Flatten any bitmap to 8-bit RGB. Already-RGB images pass through as-is.
pub fn to_rgb(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}

/// Scale `img` down to fit within a `max_edge` × `max_edge` box.
///
/// Aspect ratio is preserved and images already inside the box are returned
/// unchanged — thumbnails never upscale.
pub fn shrink_to_box(img: &DynamicImage, max_edge: u32) -> DynamicImage {
    if img.width() <= max_edge && img.height() <= max_edge {
        img.clone()
    } else {
        img.thumbnail(max_edge, max_edge)
    }
}

/// JPEG-encode `img` at the given quality into a byte buffer.
fn encode_jpeg(img: &DynamicImage, quality: u8, page_num: usize) -> Result<Vec<u8>, ConvertError> {
    let owned;
    let rgb = match img.as_rgb8() {
        Some(rgb) => rgb,
        None => {
            owned = img.to_rgb8();
            &owned
        }
    };

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .encode(rgb.as_raw(), rgb.width(), rgb.height(), ExtendedColorType::Rgb8)
        .map_err(|e| ConvertError::EncodeFailed {
            page: page_num,
            detail: e.to_string(),
        })?;
    Ok(buf)
}

/// Write `bytes` to `path` atomically (temp file + rename).
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ConvertError> {
    let tmp_path = path.with_extension("jpg.tmp");
    std::fs::write(&tmp_path, bytes).map_err(|e| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })?;
    std::fs::rename(&tmp_path, path).map_err(|e| ConvertError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Write the full-size preview JPEG for a page.
///
/// # Returns
/// The written path and its byte size.
pub fn write_preview(
    img: &DynamicImage,
    dir: &Path,
    page_num: usize,
    quality: u8,
) -> Result<(PathBuf, usize), ConvertError> {
    let bytes = encode_jpeg(img, quality, page_num)?;
    let path = dir.join(preview_filename(page_num));
    write_atomic(&path, &bytes)?;
    debug!(
        "Wrote preview {} ({}x{}, {} bytes)",
        path.display(),
        img.width(),
        img.height(),
        bytes.len()
    );
    Ok((path, bytes.len()))
}

/// Write the thumbnail JPEG for a page, derived from the full-size bitmap.
pub fn write_thumbnail(
    img: &DynamicImage,
    dir: &Path,
    page_num: usize,
    quality: u8,
    max_edge: u32,
) -> Result<PathBuf, ConvertError> {
    let thumb = shrink_to_box(img, max_edge);
    let bytes = encode_jpeg(&thumb, quality, page_num)?;
    let path = dir.join(thumbnail_filename(page_num));
    write_atomic(&path, &bytes)?;
    debug!(
        "Wrote thumbnail {} ({}x{}, {} bytes)",
        path.display(),
        thumb.width(),
        thumb.height(),
        bytes.len()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn filenames_are_one_indexed() {
        assert_eq!(preview_filename(1), "page-1.jpg");
        assert_eq!(preview_filename(12), "page-12.jpg");
        assert_eq!(thumbnail_filename(1), "page-1-thumb.jpg");
        assert_eq!(thumbnail_filename(12), "page-12-thumb.jpg");
    }

    #[test]
    fn to_rgb_flattens_alpha() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 6, Rgba([10, 20, 30, 128])));
        let rgb = to_rgb(rgba);
        assert!(rgb.as_rgb8().is_some());
        assert_eq!((rgb.width(), rgb.height()), (8, 6));
    }

    #[test]
    fn to_rgb_passes_rgb_through() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(4, 4, Rgb([1, 2, 3])));
        assert!(matches!(to_rgb(img), DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn shrink_caps_the_long_edge() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(1000, 500, Rgb([200, 0, 0])));
        let thumb = shrink_to_box(&img, 480);
        assert_eq!((thumb.width(), thumb.height()), (480, 240));
    }

    #[test]
    fn shrink_never_upscales() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(100, 80, Rgb([0, 200, 0])));
        let thumb = shrink_to_box(&img, 480);
        assert_eq!((thumb.width(), thumb.height()), (100, 80));
    }

    #[test]
    fn preview_is_a_decodable_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(64, 48, Rgba([0, 0, 255, 255])));

        let (path, size) = write_preview(&img, dir.path(), 1, 95).unwrap();
        assert_eq!(path, dir.path().join("page-1.jpg"));
        assert!(size > 0);

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn thumbnail_fits_the_box() {
        let dir = tempfile::tempdir().unwrap();
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(2000, 1000, Rgb([7, 7, 7])));

        let path = write_thumbnail(&img, dir.path(), 3, 85, 480).unwrap();
        assert_eq!(path, dir.path().join("page-3-thumb.jpg"));

        let decoded = image::open(&path).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (480, 240));
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([9, 9, 9])));

        write_preview(&img, dir.path(), 1, 90).unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty(), "temp files left: {leftovers:?}");
    }
}
