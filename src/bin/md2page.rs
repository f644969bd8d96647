//! CLI binary for md2page.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use md2page::{convert_file, ConversionConfig, ImageMode};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Basic conversion (post.md → post.html)
  md2page post.md

  # Explicit output path
  md2page post.md site/post.html

  # Materialize image assets: fetch, resize to 800x600, write PNGs
  md2page --mode assets post.md

  # Custom asset resolution and directory
  md2page --mode assets --image-width 1200 --image-height 900 \
          --image-dir site/assets post.md site/post.html

  # Structured JSON result (html + metadata + per-image outcomes + stats)
  md2page --json post.md > result.json

IMAGE MODES:
  caption (default)  Wrap captioned images in <figure> elements. No network
                     or filesystem access; running it twice is a no-op.
  assets             Additionally fetch every referenced image, resize it to
                     the target resolution, re-encode as PNG into the image
                     directory, and point the page at the local copy. A
                     broken image never fails the conversion; its original
                     markup is kept and the failure is reported.

FRONT-MATTER KEYS:
  title, description, keywords, canonical, url, image, date
  All optional; missing keys fall back to built-in defaults.
"#;

/// Convert Markdown documents to styled, self-contained HTML pages.
#[derive(Parser, Debug)]
#[command(
    name = "md2page",
    version,
    about = "Convert Markdown documents to styled, self-contained HTML pages",
    long_about = "Convert a Markdown document (with optional YAML front-matter) into a complete, \
styled HTML page: metadata head, inline styles, MathJax, captioned figures, and optionally \
locally materialized image assets.",
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Markdown input file.
    input: Option<PathBuf>,

    /// HTML output file. Default: the input path with an .html extension.
    output: Option<PathBuf>,

    /// Image handling mode.
    #[arg(long, env = "MD2PAGE_MODE", value_enum, default_value = "caption")]
    mode: ModeArg,

    /// Directory for materialized PNG assets.
    /// Default: "images" next to the output file.
    #[arg(long, env = "MD2PAGE_IMAGE_DIR")]
    image_dir: Option<PathBuf>,

    /// Target width in pixels for materialized images.
    #[arg(long, env = "MD2PAGE_IMAGE_WIDTH", default_value_t = 800)]
    image_width: u32,

    /// Target height in pixels for materialized images.
    #[arg(long, env = "MD2PAGE_IMAGE_HEIGHT", default_value_t = 600)]
    image_height: u32,

    /// Number of concurrent image fetches.
    #[arg(short, long, env = "MD2PAGE_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,

    /// Per-request timeout for remote image downloads in seconds.
    #[arg(long, env = "MD2PAGE_FETCH_TIMEOUT", default_value_t = 30)]
    fetch_timeout: u64,

    /// Skip the MathJax configuration and loader script.
    #[arg(long, env = "MD2PAGE_NO_MATH")]
    no_math: bool,

    /// Print the structured JSON result (ConversionOutput) to stdout.
    #[arg(long, env = "MD2PAGE_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "MD2PAGE_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "MD2PAGE_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ModeArg {
    Caption,
    Assets,
}

impl From<ModeArg> for ImageMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Caption => ImageMode::CaptionOnly,
            ModeArg::Assets => ImageMode::Materialize,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let Some(input) = cli.input.clone() else {
        eprintln!("Usage: md2page <input.md> [output.html]");
        eprintln!("Run 'md2page --help' for the full flag reference.");
        std::process::exit(1);
    };

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Resolve paths ────────────────────────────────────────────────────
    let output_path = cli
        .output
        .clone()
        .unwrap_or_else(|| input.with_extension("html"));

    // Assets land next to the HTML unless told otherwise, so the emitted
    // "images/<file>.png" src values resolve in a browser without a server.
    let image_dir = cli.image_dir.clone().unwrap_or_else(|| {
        match output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent.join("images"),
            None => PathBuf::from("images"),
        }
    });

    // ── Build config ─────────────────────────────────────────────────────
    let config = ConversionConfig::builder()
        .image_mode(cli.mode.clone().into())
        .image_size(cli.image_width, cli.image_height)
        .image_dir(image_dir)
        .concurrency(cli.concurrency)
        .fetch_timeout_secs(cli.fetch_timeout)
        .include_math(!cli.no_math)
        .build()
        .context("Invalid configuration")?;

    // ── Run conversion ───────────────────────────────────────────────────
    let output = convert_file(&input, &output_path, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    }

    if !cli.quiet {
        let stats = &output.stats;
        let tick = if stats.images_failed == 0 {
            green("✔")
        } else {
            cyan("⚠")
        };
        eprintln!(
            "{tick}  {} → {}  {}",
            input.display(),
            bold(&output_path.display().to_string()),
            dim(&format!("{}ms", stats.total_duration_ms)),
        );
        if stats.images_found > 0 {
            eprintln!(
                "   {} images found, {} rewritten, {} failed",
                stats.images_found, stats.images_rewritten, stats.images_failed
            );
        }
        if let Some(ref e) = output.front_matter_error {
            eprintln!("   front-matter ignored: {e}");
        }
    }

    Ok(())
}
