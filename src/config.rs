//! Configuration types for Markdown-to-HTML conversion.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. Keeping every knob in one struct makes
//! it trivial to share configs across threads, serialise them for logging, and
//! diff two runs to understand why their outputs differ.
//!
//! The constant style/script fragments injected by the assembler live in
//! [`crate::theme`]; this module holds only the per-run knobs.

use crate::error::Md2PageError;
use crate::metadata::PageMeta;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// How the image/caption post-processor treats `<img>` elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageMode {
    /// Caption-only rewriting: wrap captioned images in `<figure>` elements
    /// without touching the image bytes. No I/O, idempotent. (default)
    #[default]
    CaptionOnly,
    /// Asset materialization: fetch or read every image, resize it to the
    /// configured resolution, re-encode as PNG into the image directory, and
    /// point the rewritten `<img>` at the local copy.
    Materialize,
}

/// Configuration for a Markdown-to-HTML conversion.
///
/// Built via [`ConversionConfig::builder()`] or using
/// [`ConversionConfig::default()`].
///
/// # Example
/// ```rust
/// use md2page::{ConversionConfig, ImageMode};
///
/// let config = ConversionConfig::builder()
///     .image_mode(ImageMode::Materialize)
///     .image_size(800, 600)
///     .concurrency(4)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConversionConfig {
    /// Image post-processing mode. Default: [`ImageMode::CaptionOnly`].
    pub image_mode: ImageMode,

    /// Target width in pixels for materialized images. Default: 800.
    pub image_width: u32,

    /// Target height in pixels for materialized images. Default: 600.
    ///
    /// Images are resampled to exactly `image_width × image_height` with a
    /// Lanczos3 filter, matching the fixed-resolution contract of the
    /// pipeline rather than preserving aspect ratio.
    pub image_height: u32,

    /// Directory that materialized PNG files are written to. Default: `images`.
    ///
    /// Created with `create_dir_all` before processing, so concurrent
    /// conversions sharing one directory are safe.
    pub image_dir: PathBuf,

    /// Prefix used for rewritten `<img src>` values, relative to the output
    /// HTML's directory. Default: the file name of `image_dir`.
    ///
    /// Kept separate from `image_dir` because the directory the PNGs land in
    /// and the path the browser resolves them from are different concerns:
    /// the CLI writes to `outputs/images/` but emits `images/foo.png`.
    pub image_src_prefix: String,

    /// Number of concurrent image fetches in materialize mode. Default: 8.
    ///
    /// Fetches are network-bound; issuing them concurrently cuts wall-clock
    /// time on image-heavy documents without changing output ordering (each
    /// replacement is applied in document order from a source → outcome map).
    pub concurrency: usize,

    /// Per-request timeout for remote image downloads in seconds. Default: 30.
    pub fetch_timeout_secs: u64,

    /// Built-in metadata defaults merged under the document's front-matter.
    pub defaults: PageMeta,

    /// Inject the MathJax configuration and loader script. Default: true.
    pub include_math: bool,

    /// Inject the figure/caption styling block. Default: true.
    pub figure_styles: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            image_mode: ImageMode::default(),
            image_width: 800,
            image_height: 600,
            image_dir: PathBuf::from("images"),
            image_src_prefix: "images".to_string(),
            concurrency: 8,
            fetch_timeout_secs: 30,
            defaults: PageMeta::default(),
            include_math: true,
            figure_styles: true,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn image_mode(mut self, mode: ImageMode) -> Self {
        self.config.image_mode = mode;
        self
    }

    pub fn image_size(mut self, width: u32, height: u32) -> Self {
        self.config.image_width = width.max(1);
        self.config.image_height = height.max(1);
        self
    }

    /// Set the image output directory and derive `image_src_prefix` from its
    /// file name. Use [`Self::image_src_prefix`] afterwards to override.
    pub fn image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        if let Some(name) = dir.file_name().and_then(|n| n.to_str()) {
            self.config.image_src_prefix = name.to_string();
        }
        self.config.image_dir = dir;
        self
    }

    pub fn image_src_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.image_src_prefix = prefix.into();
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    pub fn fetch_timeout_secs(mut self, secs: u64) -> Self {
        self.config.fetch_timeout_secs = secs.max(1);
        self
    }

    pub fn defaults(mut self, defaults: PageMeta) -> Self {
        self.config.defaults = defaults;
        self
    }

    pub fn include_math(mut self, v: bool) -> Self {
        self.config.include_math = v;
        self
    }

    pub fn figure_styles(mut self, v: bool) -> Self {
        self.config.figure_styles = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, Md2PageError> {
        let c = &self.config;
        if c.image_width == 0 || c.image_height == 0 {
            return Err(Md2PageError::InvalidConfig(format!(
                "Image size must be non-zero, got {}x{}",
                c.image_width, c.image_height
            )));
        }
        if c.concurrency == 0 {
            return Err(Md2PageError::InvalidConfig(
                "Concurrency must be ≥ 1".into(),
            ));
        }
        if c.image_src_prefix.is_empty() {
            return Err(Md2PageError::InvalidConfig(
                "image_src_prefix must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}
