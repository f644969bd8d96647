//! Markdown rendering: body text → HTML fragment via pulldown-cmark.
//!
//! The extension set is a fixed constant of the pipeline, not a call-time
//! knob — every document a deployment produces should parse identically.
//! Enabled on top of CommonMark (which already covers fenced code blocks):
//! tables, footnotes, strikethrough, task lists, smart punctuation, and
//! heading attributes.
//!
//! ## Heading anchors
//!
//! pulldown-cmark parses explicit `{#id}` attributes but does not invent ids
//! for plain headings, so deep links into a page would not work out of the
//! box. We rewrite the event stream before serialisation: every heading
//! without an explicit id gets a slug derived from its text, deduplicated
//! with a numeric suffix. Rendering arbitrary text never fails; malformed
//! Markdown degrades per CommonMark leniency.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag, TagEnd};
use std::collections::HashMap;

/// The fixed extension configuration for this pipeline.
fn extension_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options
}

/// Render Markdown body text to an HTML fragment.
pub fn render_html(markdown: &str) -> String {
    let mut events: Vec<Event> = Parser::new_ext(markdown, extension_options()).collect();
    inject_heading_ids(&mut events);

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    out
}

/// Assign slug ids to headings that lack an explicit `{#id}` attribute.
fn inject_heading_ids(events: &mut [Event]) {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut i = 0;

    while i < events.len() {
        let explicit = match &events[i] {
            Event::Start(Tag::Heading { id, .. }) => Some(id.clone()),
            _ => None,
        };
        let Some(explicit) = explicit else {
            i += 1;
            continue;
        };

        if let Some(id) = explicit {
            // Explicit ids stay untouched but reserve their slot so a
            // generated slug never collides with them.
            seen.entry(id.to_string()).or_insert(1);
            i += 1;
            continue;
        }

        // Gather the heading's text up to its end tag.
        let mut text = String::new();
        let mut j = i + 1;
        while j < events.len() {
            match &events[j] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
            j += 1;
        }

        let base = slugify(&text);
        let count = seen.entry(base.clone()).or_insert(0);
        let unique = if *count == 0 {
            base.clone()
        } else {
            format!("{base}-{count}")
        };
        *count += 1;

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            *id = Some(CowStr::from(unique));
        }
        i = j;
    }
}

/// Lowercase alphanumeric slug; runs of other characters collapse to `-`.
fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            for lc in c.to_lowercase() {
                slug.push(lc);
            }
        } else {
            pending_dash = true;
        }
    }
    if slug.is_empty() {
        "section".to_string()
    } else {
        slug
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_heading_with_slug_anchor() {
        let html = render_html("# Hello World\n");
        assert!(html.contains("<h1 id=\"hello-world\">Hello World</h1>"), "got: {html}");
    }

    #[test]
    fn explicit_heading_id_wins() {
        let html = render_html("# Hello {#greeting}\n");
        assert!(html.contains("id=\"greeting\""), "got: {html}");
    }

    #[test]
    fn duplicate_headings_get_suffixed_anchors() {
        let html = render_html("# Setup\n\ntext\n\n# Setup\n");
        assert!(html.contains("id=\"setup\""));
        assert!(html.contains("id=\"setup-1\""));
    }

    #[test]
    fn tables_are_enabled() {
        let html = render_html("| A | B |\n| --- | --- |\n| 1 | 2 |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn footnotes_are_enabled() {
        let html = render_html("text[^1]\n\n[^1]: the note\n");
        assert!(html.contains("footnote"), "got: {html}");
    }

    #[test]
    fn task_lists_are_enabled() {
        let html = render_html("- [x] done\n- [ ] todo\n");
        assert!(html.contains("type=\"checkbox\""));
    }

    #[test]
    fn fenced_code_blocks_render() {
        let html = render_html("```rust\nfn main() {}\n```\n");
        assert!(html.contains("<pre><code class=\"language-rust\">"));
    }

    #[test]
    fn smart_punctuation_is_enabled() {
        let html = render_html("\"quoted\"\n");
        assert!(html.contains('\u{201C}'), "got: {html}");
    }

    #[test]
    fn arbitrary_text_never_panics() {
        let html = render_html("<<<[[]]\0--- ||| ![](");
        assert!(!html.is_empty());
    }

    #[test]
    fn slugify_degenerate_heading() {
        assert_eq!(slugify("!!!"), "section");
        assert_eq!(slugify("A  B--C"), "a-b-c");
    }
}
