//! Metadata resolution: front-matter merged over built-in defaults.
//!
//! The resolver is a pure function. Every field of [`PageMeta`] is always
//! present after resolution — a field missing from the front-matter simply
//! keeps its default — so the assembler never has to handle absent keys.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// The canonical per-page metadata record consumed by the document assembler.
///
/// `date` is an ISO-8601 date string or empty; empty means "no date
/// subtitle". `canonical` falls back to `url` during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub canonical: String,
    pub url: String,
    pub image: String,
    pub date: String,
}

impl Default for PageMeta {
    fn default() -> Self {
        Self {
            title: "Untitled".to_string(),
            description: String::new(),
            keywords: String::new(),
            canonical: String::new(),
            url: String::new(),
            image: String::new(),
            date: String::new(),
        }
    }
}

/// Merge a parsed front-matter mapping over the default record.
///
/// A front-matter value wins when it is present and non-empty. Scalar YAML
/// values other than strings (numbers, booleans) are coerced to their
/// string form; sequences and nested mappings are ignored.
pub fn resolve(front: &Mapping, defaults: &PageMeta) -> PageMeta {
    let pick = |key: &str, fallback: &str| -> String {
        match scalar(front, key) {
            Some(v) if !v.is_empty() => v,
            _ => fallback.to_string(),
        }
    };

    let url = pick("url", &defaults.url);
    let canonical = match scalar(front, "canonical") {
        Some(v) if !v.is_empty() => v,
        // canonical falls back to the page URL, then to the default
        _ if !url.is_empty() => url.clone(),
        _ => defaults.canonical.clone(),
    };

    PageMeta {
        title: pick("title", &defaults.title),
        description: pick("description", &defaults.description),
        keywords: pick("keywords", &defaults.keywords),
        canonical,
        url,
        image: pick("image", &defaults.image),
        date: pick("date", &defaults.date),
    }
}

/// Extract a scalar front-matter value as a string.
fn scalar(front: &Mapping, key: &str) -> Option<String> {
    let value = front
        .iter()
        .find(|(k, _)| k.as_str() == Some(key))
        .map(|(_, v)| v)?;
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
