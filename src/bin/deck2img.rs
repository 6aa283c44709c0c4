//! CLI binary for the deck2img preview pipeline.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig`, renders progress on stderr, and prints the single
//! JSON result line on stdout.
//!
//! ## Exit behaviour
//!
//! The process exits 0 whether the conversion succeeds or fails; callers
//! detect success by the presence of exactly one JSON object on stdout.
//! Only CLI usage errors (bad flags) exit non-zero, via clap.

use anyhow::{Context, Result};
use clap::Parser;
use deck2img::{
    convert, ConversionConfig, ConversionProgressCallback, ProgressCallback,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: renders a live progress bar and per-page log
/// lines using [indicatif]. Everything goes to stderr so the JSON result
/// line on stdout stays clean.
struct CliProgressCallback {
    /// The single progress bar anchored at the bottom of the terminal.
    bar: ProgressBar,
    /// Per-page wall-clock start times for elapsed reporting.
    start_times: Mutex<HashMap<usize, Instant>>,
    /// Count of pages that errored out.
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Create a callback whose progress-bar length is set dynamically
    /// by `on_conversion_start` (the page count is unknown until the
    /// renderer has produced the PDF).
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_conversion_start

        // Initial style: spinner only — the renderer step has no page count.
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(spinner_style);
        bar.set_prefix("Rendering");
        bar.set_message("Converting document to PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    /// Switch to the full progress-bar style once we know `total`.
    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Rasterising");
        self.bar.reset_eta();
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_pdf_ready(&self, pdf_path: &std::path::Path) {
        self.bar.println(format!(
            "{} PDF ready: {}",
            cyan("◆"),
            dim(&pdf_path.display().to_string())
        ));
    }

    fn on_conversion_start(&self, total_pages: usize) {
        // Switch from spinner-only style to the full bar now that the PDF
        // has been opened and the page count is known.
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rasterising {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap()
            .insert(page_num, Instant::now());
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, preview_bytes: usize) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&page_num)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<12}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{preview_bytes:>7} bytes")),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let elapsed_ms = self
            .start_times
            .lock()
            .unwrap()
            .remove(&page_num)
            .map(|t| t.elapsed().as_millis())
            .unwrap_or(0);

        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = truncate_message(error);

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{:.1}s", elapsed_ms as f64 / 1000.0)),
        ));
        self.bar.inc(1);
    }

    fn on_conversion_complete(&self, total_pages: usize, success_count: usize) {
        let failed = total_pages.saturating_sub(success_count);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} pages converted successfully",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} pages converted  ({} failed)",
                if failed == total_pages {
                    red("✘")
                } else {
                    cyan("⚠")
                },
                bold(&success_count.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

/// Truncate very long error messages to keep the per-page log tidy.
///
/// Counts chars, not bytes — error messages embed file paths, and slicing a
/// non-ASCII deck name at a byte offset would panic mid-report.
fn truncate_message(error: &str) -> String {
    const MAX_CHARS: usize = 80;
    if error.chars().count() <= MAX_CHARS {
        return error.to_string();
    }
    let prefix: String = error.chars().take(MAX_CHARS - 1).collect();
    format!("{prefix}\u{2026}")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion
  deck2img slides.pptx out/

  # Lower-resolution previews, smaller thumbnails
  deck2img --dpi 96 --thumbnail-size 240 slides.pptx out/

  # Explicit tool locations
  deck2img --soffice-path /opt/libreoffice/program/soffice \
           --pdfium-path /usr/lib/libpdfium.so slides.pptx out/

  # Consume the result from a script
  deck2img --no-progress slides.pptx out/ | jq .page_count

OUTPUT LAYOUT (under <output_root>):
  <basename>.pdf                    intermediate PDF, left in place
  previews/page-1.jpg …             full-size page images (JPEG, quality 95)
  thumbnails/page-1-thumb.jpg …     ≤ 480×480 thumbnails (JPEG, quality 85)

RESULT LINE (stdout, on success only):
  {"previews":[…],"thumbnails":[…],"page_count":n}

  Exactly one JSON object, or nothing on failure. All progress and error
  text goes to stderr. The exit code is 0 either way — parse stdout.

ENVIRONMENT VARIABLES:
  SOFFICE_PATH       Path to the soffice executable — skips install search
  PDFIUM_LIB_PATH    Path to an existing libpdfium shared library

SETUP:
  1. Install LibreOffice (provides soffice).
  2. Install PDFium (libpdfium.so / .dylib / pdfium.dll) system-wide, or
     point PDFIUM_LIB_PATH at a copy.
  3. Convert:  deck2img slides.pptx out/
"#;

/// Convert a presentation document into per-page previews and thumbnails.
#[derive(Parser, Debug)]
#[command(
    name = "deck2img",
    version,
    about = "Render presentation documents to JPEG previews and thumbnails",
    long_about = "Convert a presentation document (.pptx, .ppt, .odp, or anything LibreOffice \
reads) into one full-size JPEG preview and one bounded thumbnail per page. The document is \
rendered to PDF by a headless LibreOffice sub-process, then rasterised page by page via PDFium.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Source presentation document.
    source: PathBuf,

    /// Output root directory (created if absent).
    output_root: PathBuf,

    /// Rendering DPI (72–600).
    #[arg(long, env = "DECK2IMG_DPI", default_value_t = 200,
          value_parser = clap::value_parser!(u32).range(72..=600))]
    dpi: u32,

    /// JPEG quality for full-size previews (1–100).
    #[arg(long, env = "DECK2IMG_PREVIEW_QUALITY", default_value_t = 95,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    preview_quality: u8,

    /// JPEG quality for thumbnails (1–100).
    #[arg(long, env = "DECK2IMG_THUMBNAIL_QUALITY", default_value_t = 85,
          value_parser = clap::value_parser!(u8).range(1..=100))]
    thumbnail_quality: u8,

    /// Thumbnail bounding-box edge in pixels.
    #[arg(long, env = "DECK2IMG_THUMBNAIL_SIZE", default_value_t = 480)]
    thumbnail_size: u32,

    /// Explicit path to the soffice executable.
    #[arg(
        long,
        env = "DECK2IMG_SOFFICE_PATH",
        long_help = "Path to the LibreOffice soffice executable. When absent, resolution walks \
          SOFFICE_PATH, the platform's well-known install locations, then the PATH."
    )]
    soffice_path: Option<PathBuf>,

    /// Explicit path to the pdfium shared library.
    #[arg(
        long,
        env = "DECK2IMG_PDFIUM_PATH",
        long_help = "Path to the PDFium shared library. When absent, resolution walks \
          PDFIUM_LIB_PATH, the working directory, then the system loader path."
    )]
    pdfium_path: Option<PathBuf>,

    /// Renderer timeout in seconds.
    #[arg(long, env = "DECK2IMG_RENDER_TIMEOUT", default_value_t = 120)]
    render_timeout: u64,

    /// Disable progress bar.
    #[arg(long, env = "DECK2IMG_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DECK2IMG_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "DECK2IMG_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs while the progress bar owns stderr;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };

    let mut builder = ConversionConfig::builder()
        .dpi(cli.dpi)
        .preview_quality(cli.preview_quality)
        .thumbnail_quality(cli.thumbnail_quality)
        .thumbnail_max_edge(cli.thumbnail_size)
        .render_timeout_secs(cli.render_timeout);

    if let Some(ref path) = cli.soffice_path {
        builder = builder.soffice_path(path);
    }
    if let Some(ref path) = cli.pdfium_path {
        builder = builder.pdfium_path(path);
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }

    let config = builder.build().context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    // Failure is part of the wire contract, not a process error: log it to
    // stderr, emit nothing on stdout, and still exit 0.
    let output = match convert(&cli.source, &cli.output_root, &config).await {
        Ok(output) => output,
        Err(e) => {
            eprintln!("{} {}", red("✘"), e);
            return Ok(());
        }
    };

    // The one stdout line a calling process parses.
    let line = output
        .result
        .to_json_line()
        .context("Failed to serialise result")?;
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(line.as_bytes())
        .and_then(|_| handle.write_all(b"\n"))
        .context("Failed to write to stdout")?;

    if !cli.quiet && !show_progress {
        // Inline summary only when the progress callback already hasn't
        // printed the final tick.
        eprintln!(
            "Converted {} pages in {}ms (render {}ms, rasterise {}ms)",
            output.stats.page_count,
            output.stats.total_duration_ms,
            output.stats.render_duration_ms,
            output.stats.rasterise_duration_ms,
        );
    } else if !cli.quiet {
        eprintln!(
            "   {}  →  {}",
            dim(&format!("{}ms total", output.stats.total_duration_ms)),
            bold(&cli.output_root.display().to_string()),
        );
    }

    Ok(())
}
