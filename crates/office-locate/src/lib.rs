//! # office-locate
//!
//! Runtime discovery of the two external capabilities the conversion pipeline
//! leans on: the LibreOffice `soffice` executable and the PDFium shared
//! library. Nothing here is compiled in — every path is resolved when the
//! process runs, so the same binary works across machines and installs.
//!
//! ## Resolution order
//!
//! [`locate_soffice`] (first match wins):
//!
//! 1. An explicit path handed in by the caller (configuration).
//! 2. The `SOFFICE_PATH` environment variable.
//! 3. Well-known per-platform install locations (see table below).
//! 4. A `soffice` executable on the `PATH`.
//!
//! [`bind_pdfium`] (first match wins):
//!
//! 1. An explicit library path handed in by the caller.
//! 2. The `PDFIUM_LIB_PATH` environment variable.
//! 3. The platform library (`libpdfium.so` / `.dylib` / `pdfium.dll`) next to
//!    the current working directory.
//! 4. The system library search path.
//!
//! ## Well-known LibreOffice locations
//!
//! | OS      | Checked paths                                              |
//! |---------|------------------------------------------------------------|
//! | Windows | `C:\Program Files\LibreOffice\program\soffice.exe` (+ x86) |
//! | macOS   | `/Applications/LibreOffice.app/Contents/MacOS/soffice`     |
//! | Linux   | `/usr/bin/soffice`, `/usr/local/bin/soffice`, `/opt/libreoffice/program/soffice` |
//!
//! ## Environment variable overrides
//!
//! - `SOFFICE_PATH` — path to an existing soffice executable.
//! - `PDFIUM_LIB_PATH` — path to an existing pdfium shared library.
//!
//! An override pointing at a missing file is reported on stderr and the
//! search continues down the chain; an explicit caller-supplied path that is
//! missing is a hard error, because it reflects configuration the caller
//! asserted.

use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable naming the soffice executable.
pub const SOFFICE_ENV: &str = "SOFFICE_PATH";

/// Environment variable naming the pdfium shared library.
pub const PDFIUM_ENV: &str = "PDFIUM_LIB_PATH";

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by office-locate operations.
#[derive(Error, Debug)]
pub enum LocateError {
    /// A caller-configured soffice path does not exist.
    #[error("Configured soffice executable '{path}' does not exist")]
    SofficeMissing { path: PathBuf },

    /// No soffice executable anywhere in the search chain.
    #[error(
        "LibreOffice 'soffice' executable not found (searched: {tried}). \
         Install LibreOffice or set {SOFFICE_ENV} to the soffice binary"
    )]
    SofficeNotFound { tried: String },

    /// A caller-configured pdfium library path does not exist.
    #[error("Configured pdfium library '{path}' does not exist")]
    PdfiumMissing { path: PathBuf },

    /// `libloading` / `pdfium-render` could not load the library.
    #[error("Failed to bind PDFium from '{path}': {reason}")]
    PdfiumBind { path: PathBuf, reason: String },
}

// ── soffice discovery ────────────────────────────────────────────────────────

/// Well-known per-platform install locations for the soffice executable.
pub fn soffice_candidates() -> Vec<PathBuf> {
    match std::env::consts::OS {
        "windows" => vec![
            PathBuf::from(r"C:\Program Files\LibreOffice\program\soffice.exe"),
            PathBuf::from(r"C:\Program Files (x86)\LibreOffice\program\soffice.exe"),
        ],
        "macos" => vec![PathBuf::from(
            "/Applications/LibreOffice.app/Contents/MacOS/soffice",
        )],
        _ => vec![
            PathBuf::from("/usr/bin/soffice"),
            PathBuf::from("/usr/local/bin/soffice"),
            PathBuf::from("/opt/libreoffice/program/soffice"),
        ],
    }
}

/// The executable name to look for on the `PATH`.
fn soffice_exe_name() -> &'static str {
    if cfg!(windows) {
        "soffice.exe"
    } else {
        "soffice"
    }
}

/// Scans the `PATH` for the first existing soffice executable.
fn soffice_on_path() -> Option<PathBuf> {
    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var)
        .map(|dir| dir.join(soffice_exe_name()))
        .find(|candidate| candidate.is_file())
}

/// Locates the soffice executable.
///
/// Resolution order: `explicit` → `SOFFICE_PATH` → well-known install
/// locations → `PATH` search. An `explicit` path that does not exist is a
/// hard error; an environment override pointing nowhere falls through with
/// a warning on stderr.
pub fn locate_soffice(explicit: Option<&Path>) -> Result<PathBuf, LocateError> {
    // 1. Caller configuration.
    if let Some(path) = explicit {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(LocateError::SofficeMissing {
            path: path.to_path_buf(),
        });
    }

    // 2. Environment variable override.
    if let Ok(env_path) = std::env::var(SOFFICE_ENV) {
        let p = PathBuf::from(&env_path);
        if p.is_file() {
            return Ok(p);
        }
        eprintln!(
            "office-locate: {SOFFICE_ENV} '{}' not found; searching installs …",
            p.display()
        );
    }

    // 3. Well-known install locations.
    if let Some(found) = soffice_candidates().into_iter().find(|c| c.is_file()) {
        return Ok(found);
    }

    // 4. PATH search.
    if let Some(found) = soffice_on_path() {
        return Ok(found);
    }

    let mut tried: Vec<String> = soffice_candidates()
        .iter()
        .map(|c| c.display().to_string())
        .collect();
    tried.push(format!("{} on PATH", soffice_exe_name()));
    Err(LocateError::SofficeNotFound {
        tried: tried.join(", "),
    })
}

// ── PDFium binding ───────────────────────────────────────────────────────────

/// Binds to a PDFium library at an explicit `path`.
///
/// Does not consult the environment or the fallback chain.
pub fn bind_pdfium_from_path(path: &Path) -> Result<Pdfium, LocateError> {
    Pdfium::bind_to_library(path)
        .map(Pdfium::new)
        .map_err(|e| LocateError::PdfiumBind {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
}

/// Binds to PDFium.
///
/// Resolution order: `explicit` → `PDFIUM_LIB_PATH` → platform library next
/// to the working directory → system library. An `explicit` path that does
/// not exist is a hard error; an environment override pointing nowhere falls
/// through with a warning on stderr.
pub fn bind_pdfium(explicit: Option<&Path>) -> Result<Pdfium, LocateError> {
    // 1. Caller configuration.
    if let Some(path) = explicit {
        if !path.exists() {
            return Err(LocateError::PdfiumMissing {
                path: path.to_path_buf(),
            });
        }
        return bind_pdfium_from_path(path);
    }

    // 2. Environment variable override.
    if let Ok(env_path) = std::env::var(PDFIUM_ENV) {
        let p = PathBuf::from(&env_path);
        if p.exists() {
            return bind_pdfium_from_path(&p);
        }
        eprintln!(
            "office-locate: {PDFIUM_ENV} '{}' not found; trying library search …",
            p.display()
        );
    }

    // 3/4. Library beside the working directory, then the system loader path.
    let local_name = Pdfium::pdfium_platform_library_name_at_path("./");
    Pdfium::bind_to_library(&local_name)
        .or_else(|_| Pdfium::bind_to_system_library())
        .map(Pdfium::new)
        .map_err(|e| LocateError::PdfiumBind {
            path: local_name,
            reason: e.to_string(),
        })
}

// ── Tests ─────────────────────────────────────────────────────────────────────
