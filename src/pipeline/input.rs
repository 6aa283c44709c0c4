//! Input validation: check the source document and prepare the output root.
//!
//! ## Why validate before spawning the renderer?
//!
//! LibreOffice reports a missing input file with an unhelpful generic exit
//! code and a message buried in its stderr. Checking existence and
//! readability up front turns that into a precise [`ConvertError`] before a
//! sub-process is ever spawned. No format sniffing happens here — the set of
//! formats the renderer accepts is its business, not ours.

use crate::error::ConvertError;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Validate that the source document exists and is readable.
///
/// Returns the path unchanged on success so callers can chain it.
pub fn validate_source(path: &Path) -> Result<PathBuf, ConvertError> {
    if !path.exists() {
        return Err(ConvertError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    // Check read permission by attempting to open
    match std::fs::File::open(path) {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(ConvertError::PermissionDenied {
                path: path.to_path_buf(),
            });
        }
        Err(_) => {
            return Err(ConvertError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
    }

    debug!("Validated source document: {}", path.display());
    Ok(path.to_path_buf())
}

/// Create the output root directory (and any missing parents).
///
/// Idempotent: an already-existing directory is fine.
pub async fn ensure_output_root(path: &Path) -> Result<(), ConvertError> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|e| ConvertError::OutputDirFailed {
            path: path.to_path_buf(),
            source: e,
        })
}
