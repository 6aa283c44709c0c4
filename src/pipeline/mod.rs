//! Pipeline stages for presentation-to-previews conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch rasterisation backend) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ soffice ──▶ rasterize ──▶ encode
//! (path)    (PDF)       (pdfium)      (JPEG files)
//! ```
//!
//! 1. [`input`]     — validate the source document and create the output root
//! 2. [`soffice`]   — drive the external LibreOffice process that converts the
//!    document to PDF; the only stage that spawns a sub-process
//! 3. [`rasterize`] — decode each PDF page to a bitmap at the configured DPI;
//!    runs in `spawn_blocking` because pdfium is not async-safe
//! 4. [`encode`]    — normalise to RGB, JPEG-encode, and write the preview and
//!    thumbnail files for each page

pub mod encode;
pub mod input;
pub mod rasterize;
pub mod soffice;
