//! # md2page
//!
//! Convert Markdown documents to styled, self-contained HTML pages.
//!
//! ## Why this crate?
//!
//! A bare Markdown renderer gives you an HTML fragment, not a page: no
//! `<head>`, no metadata, no styling, images left pointing at whatever the
//! author typed. This crate wraps a strict rendering pipeline around
//! pulldown-cmark that splits YAML front-matter, rewrites images into
//! captioned `<figure>` elements (optionally fetching and resizing them into
//! local PNG assets), resolves page metadata, and assembles a complete HTML
//! document with inline styles and optional MathJax.
//!
//! ## Pipeline Overview
//!
//! ```text
//! Markdown text
//!  │
//!  ├─ 1. Split     YAML front-matter off the body (malformed YAML is non-fatal)
//!  ├─ 2. Render    body → HTML fragment (fixed pulldown-cmark extension set)
//!  ├─ 3. Images    figure/caption rewriting; optional fetch + resize + PNG
//!  ├─ 4. Metadata  front-matter over configured defaults
//!  └─ 5. Assemble  head, styles, MathJax, date subtitle → full document
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use md2page::{convert, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::default();
//!     let output = convert("---\ntitle: Hello\n---\n# Hi\n", &config).await?;
//!     println!("{}", output.html);
//!     eprintln!("images: {}/{} rewritten",
//!         output.stats.images_rewritten,
//!         output.stats.images_found);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `md2page` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library to avoid pulling in CLI-only deps:
//! ```toml
//! md2page = { version = "0.3", default-features = false }
//! ```
//!
//! ## Error model
//!
//! Fatal conditions (missing input file, unwritable output or image
//! directory) return [`Md2PageError`]. Per-image failures in materialize mode
//! never abort a conversion: each one is recorded as an [`ImageFailure`] in
//! the corresponding [`ImageOutcome`] and the original markup stays in place.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod metadata;
pub mod output;
pub mod pipeline;
pub mod theme;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder, ImageMode};
pub use convert::{convert, convert_file, convert_sync};
pub use error::{ImageFailure, Md2PageError};
pub use metadata::PageMeta;
pub use output::{ConversionOutput, ConversionStats, ImageOutcome};
