//! Output types returned by the `convert*` entry points.

use crate::error::ImageFailure;
use crate::metadata::PageMeta;
use serde::{Deserialize, Serialize};

/// The result of a successful conversion.
///
/// A conversion succeeds even when individual images failed; inspect
/// [`ConversionStats::images_failed`] and [`ConversionOutput::images`] for
/// per-image outcomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    /// The complete, self-contained HTML document.
    pub html: String,

    /// The resolved metadata record the document was assembled from.
    pub meta: PageMeta,

    /// Per-image outcomes, in document order.
    pub images: Vec<ImageOutcome>,

    /// Set when the document carried a front-matter block that failed to
    /// parse. The conversion continued with empty metadata; this field lets
    /// callers distinguish "no front matter" from "malformed front matter".
    pub front_matter_error: Option<String>,

    /// Aggregate statistics.
    pub stats: ConversionStats,
}

/// What happened to a single `<img>` element.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageOutcome {
    /// The source reference as it appeared in the rendered fragment.
    pub src: String,

    /// The caption that was applied, if any.
    pub caption: Option<String>,

    /// File name of the materialized PNG, when asset mode wrote one.
    pub written: Option<String>,

    /// The failure that left this image's original markup in place, if any.
    pub error: Option<ImageFailure>,
}

/// Aggregate statistics for one conversion.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionStats {
    /// Total `<img>` elements found in the rendered fragment.
    pub images_found: usize,
    /// Images rewritten into figures (and, in asset mode, materialized).
    pub images_rewritten: usize,
    /// Images whose processing failed; original markup preserved.
    pub images_failed: usize,
    /// Markdown rendering time.
    pub render_duration_ms: u64,
    /// Image post-processing time (fetch + resize + rewrite).
    pub image_duration_ms: u64,
    /// Wall-clock time for the whole conversion.
    pub total_duration_ms: u64,
}
