//! Error types for the deck2img library.
//!
//! Two distinct error types reflect the two independent entry points:
//!
//! * [`ConvertError`] — **Fatal**: the preview pipeline cannot produce a
//!   result (missing input, renderer failure, rasterisation failure).
//!   Returned as `Err(ConvertError)` from the top-level `convert*` functions.
//!   Every variant is terminal for the run: the driver logs it and emits
//!   nothing on stdout.
//!
//! * [`ExtractError`] — failures of the text extractor (bad container,
//!   unparseable slide XML). Returned from [`crate::extract`] so library
//!   callers can branch structurally; the `deck2text` CLI flattens it into
//!   a human-readable string on stdout to preserve the original wire
//!   contract.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the preview pipeline.
#[derive(Debug, Error)]
pub enum ConvertError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Source document was not found at the given path.
    #[error("Source document not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the source document.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The output root (or a subdirectory of it) could not be created.
    #[error("Failed to create output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Renderer errors ───────────────────────────────────────────────────
    /// No usable soffice executable anywhere in the search chain.
    #[error(
        "LibreOffice renderer unavailable: {0}\n\
         Install LibreOffice, or point SOFFICE_PATH / --soffice-path at the soffice binary."
    )]
    RendererNotFound(String),

    /// The renderer process could not be started at all.
    #[error("Failed to start renderer '{path}': {source}")]
    RendererSpawnFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The renderer ran but exited with a failure status.
    #[error("Renderer exited with {status}; PDF conversion failed.\nRenderer output:\n{stderr}")]
    RendererFailed { status: String, stderr: String },

    /// The renderer exceeded the configured timeout and was killed.
    #[error("Renderer timed out after {secs}s\nIncrease --render-timeout for large documents.")]
    RendererTimedOut { secs: u64 },

    /// The renderer exited successfully but the expected PDF never appeared.
    #[error(
        "Renderer reported success but '{path}' was not produced.\n\
         The source format may be unsupported by this LibreOffice install."
    )]
    PdfMissing { path: PathBuf },

    // ── Rasterisation errors ──────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
To make PDFium available you can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Pass --pdfium-path on the command line.\n\
  • Place libpdfium next to the working directory or install it system-wide.\n"
    )]
    PdfiumBindingFailed(String),

    /// The produced PDF exists but pdfium could not open it.
    #[error("Could not open PDF '{path}': {detail}")]
    PdfOpenFailed { path: PathBuf, detail: String },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// JPEG encoding failed for a specific page.
    #[error("JPEG encoding failed for page {page}: {detail}")]
    EncodeFailed { page: usize, detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write an output image file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Errors returned by the text extractor.
///
/// The `deck2text` CLI never surfaces these structurally; it prints a
/// flattened message as the sole stdout content. Library callers get the
/// full enum.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Presentation file was not found at the given path.
    #[error("Presentation file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// The input is not a readable PPTX (ZIP) package.
    #[error("Not a readable PPTX package: {detail}")]
    NotAPresentation { detail: String },

    /// A slide part was present but its XML could not be parsed.
    #[error("Slide XML '{name}' could not be parsed: {detail}")]
    SlideXml { name: String, detail: String },

    /// Underlying I/O failure while reading the package.
    #[error("I/O error reading presentation: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renderer_failed_display() {
        let e = ConvertError::RendererFailed {
            status: "exit status: 77".into(),
            stderr: "soffice: no display".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("exit status: 77"), "got: {msg}");
        assert!(msg.contains("no display"));
    }

    #[test]
    fn renderer_timeout_display() {
        let e = ConvertError::RendererTimedOut { secs: 120 };
        assert!(e.to_string().contains("120s"));
        assert!(e.to_string().contains("--render-timeout"));
    }

    #[test]
    fn pdf_missing_display() {
        let e = ConvertError::PdfMissing {
            path: PathBuf::from("/out/deck.pdf"),
        };
        assert!(e.to_string().contains("/out/deck.pdf"));
        assert!(e.to_string().contains("was not produced"));
    }

    #[test]
    fn rasterisation_failed_display() {
        let e = ConvertError::RasterisationFailed {
            page: 3,
            detail: "bitmap allocation failed".into(),
        };
        assert!(e.to_string().contains("page 3"));
        assert!(e.to_string().contains("bitmap allocation failed"));
    }

    #[test]
    fn extract_not_a_presentation_display() {
        let e = ExtractError::NotAPresentation {
            detail: "invalid Zip archive".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("PPTX package"));
        assert!(msg.contains("invalid Zip archive"));
    }
}
