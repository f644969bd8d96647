//! Front-matter splitting: separate the optional `---` metadata block from
//! the document body.
//!
//! ## Failure policy
//!
//! A malformed block must not take the document down with it. Two distinct
//! degradations, both deterministic:
//!
//! * Unterminated block (fewer than three `---`-delimited parts): the whole
//!   text is treated as body, metadata is empty. Not an error — a document
//!   that merely *starts* with `---` is common enough.
//! * Delimiters present but the inner YAML fails to parse: metadata is empty,
//!   the error is logged and surfaced to the caller via
//!   [`crate::output::ConversionOutput::front_matter_error`] so the data loss
//!   is never silent.

use serde_yaml::Mapping;
use tracing::{debug, warn};

/// Result of splitting a raw document.
pub struct SplitDocument<'a> {
    /// Parsed front-matter mapping; empty when absent or malformed.
    pub front: Mapping,
    /// Document body with leading whitespace trimmed.
    pub body: &'a str,
    /// YAML parse error for a present-but-malformed block.
    pub parse_error: Option<String>,
}

/// Split raw document text into front-matter and body.
pub fn split(text: &str) -> SplitDocument<'_> {
    if !has_delimiter(text) {
        return SplitDocument {
            front: Mapping::new(),
            body: text.trim_start(),
            parse_error: None,
        };
    }

    let mut parts = text.splitn(3, "---");
    let _leading = parts.next();
    let block = parts.next();
    let body = parts.next();

    match (block, body) {
        (Some(block), Some(body)) => {
            let (front, parse_error) = parse_block(block);
            SplitDocument {
                front,
                body: body.trim_start(),
                parse_error,
            }
        }
        // Unterminated block: treat everything as body.
        _ => SplitDocument {
            front: Mapping::new(),
            body: text.trim_start(),
            parse_error: None,
        },
    }
}

/// A front-matter block only counts when the document *starts* with a
/// delimiter line consisting of exactly `---`.
fn has_delimiter(text: &str) -> bool {
    matches!(text.lines().next(), Some(first) if first.trim_end() == "---")
}

fn parse_block(block: &str) -> (Mapping, Option<String>) {
    if block.trim().is_empty() {
        return (Mapping::new(), None);
    }
    match serde_yaml::from_str::<Mapping>(block) {
        Ok(front) => {
            debug!("Parsed front matter: {} keys", front.len());
            (front, None)
        }
        Err(e) => {
            warn!("Malformed front matter, continuing with empty metadata: {e}");
            (Mapping::new(), Some(e.to_string()))
        }
    }
}
