//! Image/caption post-processing: the core of the pipeline.
//!
//! Scans the rendered HTML fragment for `<img>` elements, derives a caption
//! (`title` wins over `alt`), and rewrites matches into
//! `<figure class="image-caption">` elements with a `<figcaption>`. In
//! [`ImageMode::Materialize`] the image bytes are additionally fetched,
//! resized, and re-encoded as local PNG assets via [`crate::pipeline::fetch`].
//!
//! Rewriting happens on a parsed DOM (kuchiki), not on regex-addressable
//! text: attribute order and case never matter, attribute values round-trip
//! exactly, and images already wrapped in a `figure` are skipped, which makes
//! the caption-only transform idempotent.
//!
//! `<figure>` is flow content and must not nest inside `<p>`, so only images
//! at paragraph level get wrapped: a paragraph whose sole element child is
//! the image is promoted, and images outside any paragraph are replaced in
//! place. An image inline among running text keeps its element shape — in
//! asset mode only its `src` is swapped — so the emitted markup is already
//! in the parser's normalized form and re-parsing never restructures it.
//!
//! The DOM handles are `Rc`-based and not `Send`, so the asset pass is split
//! in three: collect descriptors (sync), fetch/resize all unique sources
//! (async, concurrent), then apply replacements in document order (sync).
//! Output ordering is therefore independent of fetch completion order, and
//! every per-image failure leaves that image's original markup in place.

use crate::config::{ConversionConfig, ImageMode};
use crate::error::ImageFailure;
use crate::output::ImageOutcome;
use crate::pipeline::fetch;
use futures::stream::{self, StreamExt};
use kuchiki::traits::TendrilSink;
use kuchiki::{Attribute, ExpandedName, NodeRef};
use markup5ever::{namespace_url, ns, LocalName, QualName};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::warn;

/// Descriptor of one `<img>` element eligible for rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub src: String,
    pub alt: String,
    pub title: String,
}

impl ImageRef {
    /// Caption precedence: `title` if non-empty, else `alt` if non-empty.
    pub fn caption(&self) -> Option<&str> {
        if !self.title.is_empty() {
            Some(&self.title)
        } else if !self.alt.is_empty() {
            Some(&self.alt)
        } else {
            None
        }
    }
}

/// Collect descriptors for every image the rewrite pass will consider.
///
/// Images already inside a `figure` are excluded; they were produced by a
/// previous run of this transform.
pub fn collect_images(fragment: &str) -> Vec<ImageRef> {
    let document = kuchiki::parse_html().one(fragment);
    let mut refs = Vec::new();
    if let Ok(matches) = document.select("img") {
        for img in matches {
            if inside_figure(img.as_node()) {
                continue;
            }
            let attrs = img.attributes.borrow();
            refs.push(ImageRef {
                src: attrs.get("src").unwrap_or_default().to_string(),
                alt: attrs.get("alt").unwrap_or_default().to_string(),
                title: attrs.get("title").unwrap_or_default().to_string(),
            });
        }
    }
    refs
}

/// Fetch, resize, and write every unique image source concurrently.
///
/// Returns source → `Ok(file name)` or `Err(failure)`; failures are logged
/// here with the offending source reference and isolated per image.
pub async fn materialize_assets(
    refs: &[ImageRef],
    client: &reqwest::Client,
    config: &ConversionConfig,
) -> HashMap<String, Result<String, ImageFailure>> {
    let mut seen = HashSet::new();
    let unique: Vec<String> = refs
        .iter()
        .filter(|r| !r.src.is_empty() && seen.insert(r.src.clone()))
        .map(|r| r.src.clone())
        .collect();

    stream::iter(unique.into_iter().map(|src| async move {
        let result = fetch::materialize(client, &src, config).await;
        if let Err(ref e) = result {
            warn!("Skipping image '{src}': {e}");
        }
        (src, result)
    }))
    .buffer_unordered(config.concurrency)
    .collect::<HashMap<_, _>>()
    .await
}

/// Apply the figure rewrite to the fragment.
///
/// `assets` is consulted only in [`ImageMode::Materialize`]; pass an empty
/// map for caption-only mode. Returns the rewritten fragment and the
/// per-image outcomes in document order.
pub fn rewrite(
    fragment: &str,
    config: &ConversionConfig,
    assets: &HashMap<String, Result<String, ImageFailure>>,
) -> (String, Vec<ImageOutcome>) {
    let document = kuchiki::parse_html().one(fragment);
    let imgs: Vec<_> = match document.select("img") {
        Ok(matches) => matches.collect(),
        Err(()) => Vec::new(),
    };

    let mut outcomes = Vec::new();
    for img in imgs {
        let node = img.as_node().clone();
        if inside_figure(&node) {
            continue;
        }

        let (src, alt, title) = {
            let attrs = img.attributes.borrow();
            (
                attrs.get("src").unwrap_or_default().to_string(),
                attrs.get("alt").unwrap_or_default().to_string(),
                attrs.get("title").unwrap_or_default().to_string(),
            )
        };
        let image_ref = ImageRef { src, alt, title };
        let caption = image_ref.caption().map(str::to_string);

        match config.image_mode {
            ImageMode::CaptionOnly => {
                let target = replacement_target(&node);
                let applies = caption.is_some() && figure_allowed(&node, &target);
                if !applies {
                    // No caption, or inline in running text: untouched.
                    outcomes.push(ImageOutcome {
                        src: image_ref.src,
                        caption: None,
                        written: None,
                        error: None,
                    });
                    continue;
                }

                let figure = new_figure();
                target.insert_before(figure.clone());
                node.detach();
                figure.append(node.clone());
                figure.append(build_caption(caption.as_deref().unwrap_or_default()));
                // When no paragraph was promoted, target IS the image node,
                // which now lives inside the figure and must stay there.
                if target != node {
                    target.detach();
                }

                outcomes.push(ImageOutcome {
                    src: image_ref.src,
                    caption,
                    written: None,
                    error: None,
                });
            }
            ImageMode::Materialize => match assets.get(&image_ref.src) {
                Some(Ok(filename)) => {
                    let new_src = format!("{}/{}", config.image_src_prefix, filename);
                    let target = replacement_target(&node);

                    if figure_allowed(&node, &target) {
                        let new_img = new_element(
                            "img",
                            vec![attr("src", &new_src), attr("alt", &image_ref.alt)],
                        );

                        let figure = new_figure();
                        figure.append(new_img);
                        if let Some(ref caption_text) = caption {
                            figure.append(build_caption(caption_text));
                        }

                        target.insert_before(figure);
                        target.detach();

                        outcomes.push(ImageOutcome {
                            src: image_ref.src,
                            caption,
                            written: Some(filename.clone()),
                            error: None,
                        });
                    } else {
                        // Inline in running text: swap the src in place, no
                        // figure wrapper.
                        img.attributes.borrow_mut().map.insert(
                            ExpandedName::new("", "src"),
                            Attribute {
                                prefix: None,
                                value: new_src,
                            },
                        );

                        outcomes.push(ImageOutcome {
                            src: image_ref.src,
                            caption: None,
                            written: Some(filename.clone()),
                            error: None,
                        });
                    }
                }
                Some(Err(failure)) => {
                    // Original markup stays in place; the failure was
                    // already logged with its source reference.
                    outcomes.push(ImageOutcome {
                        src: image_ref.src,
                        caption,
                        written: None,
                        error: Some(failure.clone()),
                    });
                }
                None => {
                    outcomes.push(ImageOutcome {
                        src: image_ref.src,
                        caption,
                        written: None,
                        error: None,
                    });
                }
            },
        }
    }

    (serialize_fragment(&document), outcomes)
}

// ── DOM helpers ──────────────────────────────────────────────────────────

fn qual(name: &str) -> QualName {
    QualName::new(None, ns!(html), LocalName::from(name))
}

fn attr(name: &str, value: &str) -> (ExpandedName, Attribute) {
    (
        ExpandedName::new("", name),
        Attribute {
            prefix: None,
            value: value.into(),
        },
    )
}

fn new_element(name: &str, attrs: Vec<(ExpandedName, Attribute)>) -> NodeRef {
    NodeRef::new_element(qual(name), attrs)
}

fn new_figure() -> NodeRef {
    new_element("figure", vec![attr("class", "image-caption")])
}

fn inside_figure(node: &NodeRef) -> bool {
    node.ancestors().any(|a| {
        a.as_element()
            .map_or(false, |el| el.name.local.as_ref() == "figure")
    })
}

fn is_paragraph(node: &NodeRef) -> bool {
    node.as_element()
        .map_or(false, |el| el.name.local.as_ref() == "p")
}

/// The node the figure replaces: the parent `<p>` when the image is its sole
/// element child (remaining children whitespace-only text), else the image
/// itself.
fn replacement_target(img_node: &NodeRef) -> NodeRef {
    if let Some(parent) = img_node.parent() {
        if is_paragraph(&parent) && sole_element_child(&parent, img_node) {
            return parent;
        }
    }
    img_node.clone()
}

/// A figure may stand where the image is only when doing so does not nest it
/// inside a `<p>`: either a sole-image paragraph was promoted, or the image
/// does not sit inside a paragraph at all. Re-parsing markup with a figure
/// inside `p` would close the paragraph early and restructure the document.
fn figure_allowed(img_node: &NodeRef, target: &NodeRef) -> bool {
    target != img_node || !img_node.parent().map_or(false, |p| is_paragraph(&p))
}

fn sole_element_child(parent: &NodeRef, img_node: &NodeRef) -> bool {
    parent.children().all(|child| {
        child == *img_node
            || child
                .as_text()
                .map_or(false, |t| t.borrow().trim().is_empty())
    })
}

static URL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"https?://[^\s<>"]+"#).unwrap());

/// Build a `<figcaption>`, turning bare URLs in the caption text into links
/// that open in a new browsing context without referrer/opener leakage.
fn build_caption(caption: &str) -> NodeRef {
    let figcaption = new_element("figcaption", Vec::new());
    let mut last = 0;

    for url_match in URL_RE.find_iter(caption) {
        if url_match.start() > last {
            figcaption.append(NodeRef::new_text(&caption[last..url_match.start()]));
        }

        // Trailing punctuation belongs to the sentence, not the URL.
        let mut url = url_match.as_str();
        while let Some(c) = url.chars().last() {
            if matches!(c, '.' | ',' | ';' | ':' | '!' | '?' | ')' | ']' | '}') {
                url = &url[..url.len() - c.len_utf8()];
            } else {
                break;
            }
        }

        let link = new_element(
            "a",
            vec![
                attr("href", url),
                attr("target", "_blank"),
                attr("rel", "noopener noreferrer"),
            ],
        );
        link.append(NodeRef::new_text(url));
        figcaption.append(link);

        if url.len() < url_match.as_str().len() {
            figcaption.append(NodeRef::new_text(&url_match.as_str()[url.len()..]));
        }
        last = url_match.end();
    }

    if last < caption.len() {
        figcaption.append(NodeRef::new_text(&caption[last..]));
    }
    figcaption
}

/// Serialize the children of `<body>` back to fragment text.
fn serialize_fragment(document: &NodeRef) -> String {
    let mut out = Vec::new();
    if let Ok(body) = document.select_first("body") {
        for child in body.as_node().children() {
            child.serialize(&mut out).ok();
        }
    }
    String::from_utf8(out).unwrap_or_default()
}
