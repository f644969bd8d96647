//! Eager (full-document) conversion entry points.
//!
//! Each call is a single-shot, stateless transformation: raw Markdown text
//! in, assembled HTML document out, nothing cached between calls. Multiple
//! documents may be converted in parallel by independent calls; the only
//! shared touchpoint is the image output directory, which is created
//! idempotently and written with per-source file names.

use crate::config::{ConversionConfig, ImageMode};
use crate::error::Md2PageError;
use crate::metadata;
use crate::output::{ConversionOutput, ConversionStats};
use crate::pipeline::{assemble, frontmatter, images, render};
use std::collections::HashMap;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Convert Markdown text to a complete HTML document.
///
/// This is the primary entry point for the library.
///
/// # Returns
/// `Ok(ConversionOutput)` on success, even if some images failed
/// (check `output.stats.images_failed`) or the front-matter block was
/// malformed (check `output.front_matter_error`).
///
/// # Errors
/// Returns `Err(Md2PageError)` only for fatal errors: the image output
/// directory could not be created, or internal failures.
///
/// # Example
/// ```rust,no_run
/// use md2page::{convert, ConversionConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = ConversionConfig::default();
///     let output = convert("---\ntitle: Hello\n---\n# Hi\n", &config).await?;
///     println!("{}", output.html);
///     Ok(())
/// }
/// ```
pub async fn convert(
    text: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2PageError> {
    let total_start = Instant::now();
    let text = text.as_ref();

    // ── Step 1: Split front matter ───────────────────────────────────────
    let doc = frontmatter::split(text);

    // ── Step 2: Render Markdown ──────────────────────────────────────────
    let render_start = Instant::now();
    let fragment = render::render_html(doc.body);
    let render_duration_ms = render_start.elapsed().as_millis() as u64;
    debug!("Rendered {} bytes of Markdown in {}ms", doc.body.len(), render_duration_ms);

    // ── Step 3: Image/caption post-processing ────────────────────────────
    let image_start = Instant::now();
    let (body, outcomes) = match config.image_mode {
        ImageMode::CaptionOnly => images::rewrite(&fragment, config, &HashMap::new()),
        ImageMode::Materialize => {
            tokio::fs::create_dir_all(&config.image_dir)
                .await
                .map_err(|e| Md2PageError::ImageDirFailed {
                    path: config.image_dir.clone(),
                    source: e,
                })?;

            let client = reqwest::Client::builder()
                .timeout(Duration::from_secs(config.fetch_timeout_secs))
                .build()
                .map_err(|e| Md2PageError::Internal(format!("HTTP client: {e}")))?;

            let refs = images::collect_images(&fragment);
            let assets = images::materialize_assets(&refs, &client, config).await;
            images::rewrite(&fragment, config, &assets)
        }
    };
    let image_duration_ms = image_start.elapsed().as_millis() as u64;

    // ── Step 4: Resolve metadata ─────────────────────────────────────────
    let meta = metadata::resolve(&doc.front, &config.defaults);

    // ── Step 5: Assemble the document ────────────────────────────────────
    let html = assemble::assemble(&meta, &body, config);

    // ── Step 6: Compute stats ────────────────────────────────────────────
    let images_failed = outcomes.iter().filter(|o| o.error.is_some()).count();
    let images_rewritten = outcomes
        .iter()
        .filter(|o| o.error.is_none())
        .filter(|o| match config.image_mode {
            ImageMode::CaptionOnly => o.caption.is_some(),
            ImageMode::Materialize => o.written.is_some(),
        })
        .count();

    let stats = ConversionStats {
        images_found: outcomes.len(),
        images_rewritten,
        images_failed,
        render_duration_ms,
        image_duration_ms,
        total_duration_ms: total_start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} bytes, {}/{} images rewritten, {}ms total",
        html.len(),
        stats.images_rewritten,
        stats.images_found,
        stats.total_duration_ms
    );

    Ok(ConversionOutput {
        html,
        meta,
        images: outcomes,
        front_matter_error: doc.parse_error,
        stats,
    })
}

/// Convert a Markdown file and write the HTML document to `output_path`.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_file(
    input_path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2PageError> {
    let input_path = input_path.as_ref();
    let text = read_input(input_path)?;
    let output = convert(&text, config).await?;

    let path = output_path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| Md2PageError::OutputWriteFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
    }

    let tmp_path = path.with_extension("html.tmp");
    tokio::fs::write(&tmp_path, &output.html)
        .await
        .map_err(|e| Md2PageError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Md2PageError::OutputWriteFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    Ok(output)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally.
pub fn convert_sync(
    text: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionOutput, Md2PageError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Md2PageError::Internal(format!("Failed to create tokio runtime: {e}")))?
        .block_on(convert(text, config))
}

/// Read the input file, mapping the common failure modes to distinct errors.
fn read_input(path: &Path) -> Result<String, Md2PageError> {
    if !path.exists() {
        return Err(Md2PageError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(text),
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            Err(Md2PageError::PermissionDenied {
                path: path.to_path_buf(),
            })
        }
        Err(e) => Err(Md2PageError::Internal(format!(
            "Failed to read '{}': {e}",
            path.display()
        ))),
    }
}
