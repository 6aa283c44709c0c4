//! CLI binary for the deck2img text extractor.
//!
//! Emits the run-level text of a presentation as the sole stdout content.
//!
//! ## Wire contract
//!
//! On failure the error message itself is printed to stdout in place of the
//! text — success and failure are structurally indistinguishable on the
//! wire, and the exit code is 0 either way. Callers that need to branch
//! should use the library's `extract::extract_text`, which returns a typed
//! `Result` instead.

use anyhow::{Context, Result};
use clap::Parser;
use deck2img::extract;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Extract run-level text from a presentation file.
#[derive(Parser, Debug)]
#[command(
    name = "deck2text",
    version,
    about = "Extract run-level text from a .pptx presentation",
    long_about = "Walk a presentation's slides, shapes, paragraphs, and text runs in document \
order and print every run's text joined by newlines. Paragraph and shape boundaries are not \
marked; shapes without a text frame contribute nothing.",
    arg_required_else_help = true
)]
struct Cli {
    /// Presentation file (.pptx).
    presentation: PathBuf,

    /// Enable DEBUG-level tracing logs on stderr.
    #[arg(short, long, env = "DECK2TEXT_VERBOSE")]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    let text = match extract::extract_text(&cli.presentation) {
        Ok(text) => text,
        Err(e) => format!("Error extracting text: {e}"),
    };

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }

    Ok(())
}
