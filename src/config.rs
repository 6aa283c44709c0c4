//! Configuration types for the preview pipeline.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads, log them, and diff two runs to
//! understand why their outputs differ.
//!
//! Tool locations deliberately live here as `Option<PathBuf>` fields rather
//! than constants: `None` means "discover at runtime" (environment variable,
//! well-known install locations, `PATH`), so no absolute path is ever baked
//! into the binary.

use crate::error::ConvertError;
use crate::progress::ProgressCallback;
use std::fmt;
use std::path::PathBuf;

/// Configuration for a presentation-to-previews conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use deck2img::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .dpi(150)
///     .thumbnail_max_edge(320)
///     .build()
///     .unwrap();
/// ```
#[derive(Clone)]
pub struct ConversionConfig {
    /// Rendering DPI used when rasterising each PDF page. Range: 72–600. Default: 200.
    ///
    /// 200 DPI keeps slide text crisp on regular displays while previews stay
    /// a few hundred kilobytes each. Drop to 96–150 when previews only ever
    /// appear thumbnailed; go higher only for print-quality zoom.
    pub dpi: u32,

    /// JPEG quality for full-size previews. Range: 1–100. Default: 95.
    ///
    /// Previews are the zoom target, so they get near-lossless quality.
    pub preview_quality: u8,

    /// JPEG quality for thumbnails. Range: 1–100. Default: 85.
    ///
    /// Thumbnails are small enough that artefacts are invisible; 85 roughly
    /// halves the byte size compared to 95.
    pub thumbnail_quality: u8,

    /// Bounding-box edge for thumbnails in pixels. Default: 480.
    ///
    /// Thumbnails are scaled to fit within a square box of this edge,
    /// preserving aspect ratio and never upscaling.
    pub thumbnail_max_edge: u32,

    /// Explicit path to the soffice executable. Default: None (auto-discover).
    ///
    /// When `None`, resolution walks `SOFFICE_PATH`, the platform's
    /// well-known install locations, then the `PATH`.
    pub soffice_path: Option<PathBuf>,

    /// Explicit path to the pdfium shared library. Default: None (auto-discover).
    ///
    /// When `None`, resolution walks `PDFIUM_LIB_PATH`, the working
    /// directory, then the system library search path.
    pub pdfium_path: Option<PathBuf>,

    /// Renderer timeout in seconds. Default: 120.
    ///
    /// LibreOffice occasionally hangs on malformed documents instead of
    /// exiting. The child process is killed once this budget is spent and the
    /// run fails with a distinct timeout error.
    pub render_timeout_secs: u64,

    /// Optional progress callback, invoked per pipeline event. Default: None.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            dpi: 200,
            preview_quality: 95,
            thumbnail_quality: 85,
            thumbnail_max_edge: 480,
            soffice_path: None,
            pdfium_path: None,
            render_timeout_secs: 120,
            progress_callback: None,
        }
    }
}

impl fmt::Debug for ConversionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionConfig")
            .field("dpi", &self.dpi)
            .field("preview_quality", &self.preview_quality)
            .field("thumbnail_quality", &self.thumbnail_quality)
            .field("thumbnail_max_edge", &self.thumbnail_max_edge)
            .field("soffice_path", &self.soffice_path)
            .field("pdfium_path", &self.pdfium_path)
            .field("render_timeout_secs", &self.render_timeout_secs)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ConversionProgressCallback>"),
            )
            .finish()
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 600);
        self
    }

    pub fn preview_quality(mut self, q: u8) -> Self {
        self.config.preview_quality = q.clamp(1, 100);
        self
    }

    pub fn thumbnail_quality(mut self, q: u8) -> Self {
        self.config.thumbnail_quality = q.clamp(1, 100);
        self
    }

    pub fn thumbnail_max_edge(mut self, px: u32) -> Self {
        self.config.thumbnail_max_edge = px.max(16);
        self
    }

    pub fn soffice_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.soffice_path = Some(path.into());
        self
    }

    pub fn pdfium_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_path = Some(path.into());
        self
    }

    pub fn render_timeout_secs(mut self, secs: u64) -> Self {
        self.config.render_timeout_secs = secs;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, ConvertError> {
        let c = &self.config;
        if c.dpi < 72 || c.dpi > 600 {
            return Err(ConvertError::InvalidConfig(format!(
                "DPI must be 72–600, got {}",
                c.dpi
            )));
        }
        if c.preview_quality == 0 || c.preview_quality > 100 {
            return Err(ConvertError::InvalidConfig(format!(
                "Preview quality must be 1–100, got {}",
                c.preview_quality
            )));
        }
        if c.thumbnail_quality == 0 || c.thumbnail_quality > 100 {
            return Err(ConvertError::InvalidConfig(format!(
                "Thumbnail quality must be 1–100, got {}",
                c.thumbnail_quality
            )));
        }
        if c.render_timeout_secs == 0 {
            return Err(ConvertError::InvalidConfig(
                "Render timeout must be ≥ 1 second".into(),
            ));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = ConversionConfig::builder().build().unwrap();
        assert_eq!(config.dpi, 200);
        assert_eq!(config.preview_quality, 95);
        assert_eq!(config.thumbnail_quality, 85);
        assert_eq!(config.thumbnail_max_edge, 480);
        assert_eq!(config.render_timeout_secs, 120);
        assert!(config.soffice_path.is_none());
        assert!(config.pdfium_path.is_none());
        assert!(config.progress_callback.is_none());
    }

    #[test]
    fn dpi_is_clamped() {
        let low = ConversionConfig::builder().dpi(10).build().unwrap();
        assert_eq!(low.dpi, 72);
        let high = ConversionConfig::builder().dpi(5000).build().unwrap();
        assert_eq!(high.dpi, 600);
    }

    #[test]
    fn qualities_are_clamped() {
        let config = ConversionConfig::builder()
            .preview_quality(0)
            .thumbnail_quality(250)
            .build()
            .unwrap();
        assert_eq!(config.preview_quality, 1);
        assert_eq!(config.thumbnail_quality, 100);
    }

    #[test]
    fn zero_timeout_rejected() {
        let err = ConversionConfig::builder()
            .render_timeout_secs(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, ConvertError::InvalidConfig(_)));
    }

    #[test]
    fn tool_paths_pass_through() {
        let config = ConversionConfig::builder()
            .soffice_path("/opt/libreoffice/program/soffice")
            .pdfium_path("/usr/lib/libpdfium.so")
            .build()
            .unwrap();
        assert_eq!(
            config.soffice_path.as_deref(),
            Some(std::path::Path::new("/opt/libreoffice/program/soffice"))
        );
        assert_eq!(
            config.pdfium_path.as_deref(),
            Some(std::path::Path::new("/usr/lib/libpdfium.so"))
        );
    }
}
