//! Pipeline stages for Markdown-to-HTML conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. switch the Markdown engine) without touching
//! other stages.
//!
//! ## Data Flow
//!
//! ```text
//! frontmatter ──▶ render ──▶ images ──▶ assemble
//! (--- split)  (pulldown)  (figures)   (document)
//! ```
//!
//! 1. [`frontmatter`] — split the optional `---` metadata block from the body
//! 2. [`render`]      — Markdown → HTML fragment with a fixed extension set
//! 3. [`images`]      — caption/figure rewriting; the only stage with I/O
//!    (via [`fetch`]) when asset materialization is enabled
//! 4. [`fetch`]       — obtain, resize, and write image assets; per-image
//!    failures are isolated and never abort the document
//! 5. [`assemble`]    — splice metadata, styles, and the processed body into
//!    the final document

pub mod assemble;
pub mod fetch;
pub mod frontmatter;
pub mod images;
pub mod render;
