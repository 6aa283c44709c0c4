//! Output types produced by the preview pipeline.
//!
//! [`ConversionResult`] is the wire type: it serialises to the single JSON
//! line a calling process reads from stdout, nothing more. Timing and the
//! intermediate PDF location live in [`ConversionOutput`] beside it, for
//! library callers and diagnostics only — they must never leak into the
//! result line, because downstream parsers treat unknown keys as a contract
//! break.

use crate::error::ConvertError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// The machine-readable result of a successful conversion.
///
/// Serialised field order is part of the contract:
/// `{"previews": […], "thumbnails": […], "page_count": n}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Preview JPEG paths, 1-indexed page order.
    pub previews: Vec<String>,
    /// Thumbnail JPEG paths, same order and length as `previews`.
    pub thumbnails: Vec<String>,
    /// Number of pages in the rendered document.
    pub page_count: usize,
}

impl ConversionResult {
    /// Serialise to the single-line JSON form emitted on stdout.
    pub fn to_json_line(&self) -> Result<String, ConvertError> {
        serde_json::to_string(self)
            .map_err(|e| ConvertError::Internal(format!("Result serialisation failed: {}", e)))
    }
}

/// Timing breakdown for one conversion run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Pages rasterised.
    pub page_count: usize,
    /// Wall-clock time spent inside the external renderer.
    pub render_duration_ms: u64,
    /// Wall-clock time spent rasterising and encoding pages.
    pub rasterise_duration_ms: u64,
    /// End-to-end wall-clock time.
    pub total_duration_ms: u64,
}

/// Everything a library caller gets back from [`crate::convert`].
#[derive(Debug, Clone)]
pub struct ConversionOutput {
    /// The wire-format result.
    pub result: ConversionResult,
    /// The intermediate PDF, left in place under the output root.
    pub pdf_path: PathBuf,
    /// Timing breakdown.
    pub stats: ConversionStats,
}
