//! # deck2img
//!
//! Convert presentation documents into JPEG previews and thumbnails.
//!
//! ## Why this crate?
//!
//! Showing a slide deck in a web or desktop UI needs page images, not the
//! deck itself. No pure-Rust library renders .pptx/.ppt/.odp with usable
//! fidelity, so this crate sequences the two tools that do it well:
//! LibreOffice converts the document to PDF, PDFium rasterises each PDF page,
//! and the `image` crate encodes a high-quality preview plus a bounded
//! thumbnail per page. A separate entry point pulls the raw run text out of a
//! .pptx package for indexing and search.
//!
//! ## Pipeline Overview
//!
//! ```text
//! deck.pptx
//!  │
//!  ├─ 1. Input      validate source, create the output root
//!  ├─ 2. Render     soffice --headless --convert-to pdf (sub-process, timeout)
//!  ├─ 3. Rasterise  decode each page via pdfium at the configured DPI
//!  └─ 4. Encode     previews/page-<n>.jpg + thumbnails/page-<n>-thumb.jpg
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use deck2img::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("deck.pptx", "out", &config).await?;
//!     println!("{}", output.result.to_json_line()?);
//!     eprintln!("{} pages in {}ms",
//!         output.stats.page_count,
//!         output.stats.total_duration_ms);
//!     Ok(())
//! }
//! ```
//!
//! Text extraction is independent of the pipeline:
//!
//! ```rust,no_run
//! let text = deck2img::extract::extract_text("deck.pptx")?;
//! # Ok::<(), deck2img::ExtractError>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `deck2img` and `deck2text` binaries (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! deck2img = { version = "0.2", default-features = false }
//! ```
//!
//! ## External tools
//!
//! Both tools are discovered at runtime via the `office-locate` crate — no
//! paths are compiled in:
//!
//! | Tool | Override | Fallback chain |
//! |------|----------|----------------|
//! | LibreOffice `soffice` | config / `SOFFICE_PATH` | well-known installs, then `PATH` |
//! | PDFium shared library | config / `PDFIUM_LIB_PATH` | working directory, then system loader |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod progress;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert, convert_sync};
pub use error::{ConvertError, ExtractError};
pub use output::{ConversionOutput, ConversionResult, ConversionStats};
pub use progress::{ConversionProgressCallback, NoopProgressCallback, ProgressCallback};
