//! Error types for the md2page library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`Md2PageError`] — **Fatal**: the conversion cannot proceed at all
//!   (input file missing, output not writable, invalid configuration).
//!   Returned as `Err(Md2PageError)` from the top-level `convert*` functions.
//!
//! * [`ImageFailure`] — **Non-fatal**: a single image asset failed
//!   (download error, unreadable file, decode failure) but the rest of the
//!   document is fine. Stored inside [`crate::output::ImageOutcome`] with the
//!   original markup left untouched, so one broken remote image never aborts
//!   a whole document conversion.
//!
//! The separation lets callers decide their own tolerance: treat any image
//! failure as an error, log and continue, or ignore failures entirely.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the md2page library.
///
/// Per-image failures use [`ImageFailure`] and are stored in
/// [`crate::output::ImageOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum Md2PageError {
    /// Input file was not found at the given path.
    #[error("Input file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the input file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// Could not create the image output directory.
    #[error("Failed to create image directory '{path}': {source}")]
    ImageDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write the output HTML file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A non-fatal error for a single image asset.
///
/// Stored alongside [`crate::output::ImageOutcome`] when an image fails in
/// asset-materialization mode. The overall conversion always continues; the
/// image's original markup is preserved in the output document.
#[derive(Debug, Clone, Error, serde::Serialize, serde::Deserialize)]
pub enum ImageFailure {
    /// Remote download failed (connection error or non-success status).
    #[error("image '{src}': download failed: {reason}")]
    Download { src: String, reason: String },

    /// Remote download exceeded the configured timeout.
    #[error("image '{src}': download timed out after {secs}s")]
    Timeout { src: String, secs: u64 },

    /// Local file could not be read.
    #[error("image '{src}': read failed: {reason}")]
    Read { src: String, reason: String },

    /// Bytes were obtained but could not be decoded as an image.
    #[error("image '{src}': decode failed: {reason}")]
    Decode { src: String, reason: String },

    /// The resized PNG could not be written to the image directory.
    #[error("image '{src}': write failed: {reason}")]
    Write { src: String, reason: String },
}

impl ImageFailure {
    /// The offending source reference, for logging and reports.
    pub fn src(&self) -> &str {
        match self {
            ImageFailure::Download { src, .. }
            | ImageFailure::Timeout { src, .. }
            | ImageFailure::Read { src, .. }
            | ImageFailure::Decode { src, .. }
            | ImageFailure::Write { src, .. } => src,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_not_found_display() {
        let e = Md2PageError::FileNotFound {
            path: PathBuf::from("post.md"),
        };
        assert!(e.to_string().contains("post.md"));
    }

    #[test]
    fn timeout_display() {
        let e = ImageFailure::Timeout {
            src: "https://example.net/a.png".into(),
            secs: 30,
        };
        let msg = e.to_string();
        assert!(msg.contains("30s"), "got: {msg}");
        assert!(msg.contains("https://example.net/a.png"));
    }

    #[test]
    fn failure_src_accessor() {
        let e = ImageFailure::Decode {
            src: "diagram.webp".into(),
            reason: "bad header".into(),
        };
        assert_eq!(e.src(), "diagram.webp");
    }
}
