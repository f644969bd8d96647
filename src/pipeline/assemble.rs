//! Document assembly: resolved metadata + processed body → final HTML page.
//!
//! All interpolated metadata passes through [`escape_html`] in both text and
//! attribute positions, so a front-matter value like `title: a"b<c>` can
//! never break attribute quoting or inject markup.

use crate::config::ConversionConfig;
use crate::metadata::PageMeta;
use crate::theme;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::Write;

/// Escape text for interpolation into HTML text or double-quoted attribute
/// positions.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

static H1_CLOSE: Lazy<Regex> = Lazy::new(|| Regex::new("(?i)</h1>").unwrap());

/// Insert a date subtitle immediately after the first `</h1>` close tag.
///
/// No date or no `<h1>` means the body comes back untouched, byte for byte.
fn inject_date(body: &str, date: &str) -> String {
    if date.is_empty() {
        return body.to_string();
    }
    let Some(m) = H1_CLOSE.find(body) else {
        return body.to_string();
    };
    let subtitle = format!("\n<p class=\"post-date\">{}</p>", escape_html(date));
    let mut out = String::with_capacity(body.len() + subtitle.len());
    out.push_str(&body[..m.end()]);
    out.push_str(&subtitle);
    out.push_str(&body[m.end()..]);
    out
}

/// Build the complete, self-contained HTML document.
pub fn assemble(meta: &PageMeta, body: &str, config: &ConversionConfig) -> String {
    let title = escape_html(&meta.title);
    let mut doc = String::with_capacity(body.len() + 4096);

    doc.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    doc.push_str("<meta charset=\"UTF-8\">\n");
    doc.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    let _ = writeln!(doc, "<title>{title}</title>");

    if !meta.description.is_empty() {
        let _ = writeln!(
            doc,
            "<meta name=\"description\" content=\"{}\">",
            escape_html(&meta.description)
        );
    }
    if !meta.keywords.is_empty() {
        let _ = writeln!(
            doc,
            "<meta name=\"keywords\" content=\"{}\">",
            escape_html(&meta.keywords)
        );
    }
    if !meta.canonical.is_empty() {
        let _ = writeln!(
            doc,
            "<link rel=\"canonical\" href=\"{}\">",
            escape_html(&meta.canonical)
        );
    }

    // Open Graph / social card tags
    let _ = writeln!(doc, "<meta property=\"og:type\" content=\"article\">");
    let _ = writeln!(doc, "<meta property=\"og:title\" content=\"{title}\">");
    if !meta.description.is_empty() {
        let _ = writeln!(
            doc,
            "<meta property=\"og:description\" content=\"{}\">",
            escape_html(&meta.description)
        );
    }
    if !meta.url.is_empty() {
        let _ = writeln!(
            doc,
            "<meta property=\"og:url\" content=\"{}\">",
            escape_html(&meta.url)
        );
    }
    if !meta.image.is_empty() {
        let image = escape_html(&meta.image);
        let _ = writeln!(doc, "<meta property=\"og:image\" content=\"{image}\">");
        let _ = writeln!(doc, "<meta name=\"twitter:card\" content=\"summary_large_image\">");
        let _ = writeln!(doc, "<meta name=\"twitter:image\" content=\"{image}\">");
    } else {
        let _ = writeln!(doc, "<meta name=\"twitter:card\" content=\"summary\">");
    }

    doc.push_str("<style>\n");
    doc.push_str(theme::BASE_STYLE);
    doc.push('\n');
    if config.figure_styles {
        doc.push_str(theme::FIGURE_STYLE);
        doc.push('\n');
    }
    if config.include_math {
        doc.push_str(theme::MATH_STYLE);
        doc.push('\n');
    }
    doc.push_str("</style>\n");

    if config.include_math {
        doc.push_str(theme::MATHJAX_SNIPPET);
        doc.push('\n');
    }

    doc.push_str("</head>\n<body>\n<main>\n");
    doc.push_str(&inject_date(body, &meta.date));
    doc.push_str("\n</main>\n</body>\n</html>\n");
    doc
}
