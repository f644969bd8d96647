//! End-to-end integration tests for md2page.
//!
//! Everything here runs offline: inputs are in-memory Markdown strings and
//! local image files created inside a tempdir, so the full suite is safe for
//! CI without gating.
//!
//! Run with:
//!   cargo test --test e2e -- --nocapture

use md2page::{convert, convert_file, ConversionConfig, ImageMode, PageMeta};
use std::path::Path;

// ── Test helpers ─────────────────────────────────────────────────────────────

async fn convert_default(text: &str) -> md2page::ConversionOutput {
    convert(text, &ConversionConfig::default())
        .await
        .expect("conversion should succeed")
}

/// Write a small real PNG to `path` so materialize mode has bytes to decode.
fn write_test_png(path: &Path, width: u32, height: u32) {
    use image::{DynamicImage, RgbaImage};
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(
        width,
        height,
        image::Rgba([120, 40, 200, 255]),
    ))
    .save(path)
    .expect("test PNG must be writable");
}

/// Assert the output is a structurally complete HTML document.
fn assert_page_quality(html: &str, context: &str) {
    assert!(
        html.starts_with("<!DOCTYPE html>"),
        "[{context}] Must start with a doctype"
    );
    assert!(html.contains("<html lang=\"en\">"), "[{context}] html element");
    assert!(html.contains("<meta charset=\"UTF-8\">"), "[{context}] charset");
    assert!(html.contains("<title>"), "[{context}] title element");
    assert!(html.contains("<main>"), "[{context}] main wrapper");
    assert!(html.ends_with("</html>\n"), "[{context}] closing tag + newline");

    // One opening tag per closing tag for the structural elements.
    for tag in ["html", "head", "body", "main"] {
        let open = html.matches(&format!("<{tag}")).count();
        let close = html.matches(&format!("</{tag}>")).count();
        assert_eq!(open, close, "[{context}] unbalanced <{tag}>");
    }

    println!("[{context}] ✓  {} bytes, quality checks passed", html.len());
}

// ── Metadata resolution ──────────────────────────────────────────────────────

#[tokio::test]
async fn defaults_apply_without_front_matter() {
    let output = convert_default("# Just a heading\n").await;

    assert_eq!(output.meta.title, "Untitled");
    assert!(output.front_matter_error.is_none());
    assert!(output.html.contains("<title>Untitled</title>"));
    assert_page_quality(&output.html, "no-front-matter");
}

#[tokio::test]
async fn front_matter_overrides_configured_defaults() {
    let mut defaults = PageMeta::default();
    defaults.title = "Site Default".into();
    defaults.description = "Default description".into();
    let config = ConversionConfig::builder().defaults(defaults).build().unwrap();

    let text = "---\ntitle: My Post\ndate: 2024-03-15\n---\n# My Post\n\nBody text.\n";
    let output = convert(text, &config).await.expect("conversion should succeed");

    assert_eq!(output.meta.title, "My Post");
    assert_eq!(output.meta.date, "2024-03-15");
    // Keys absent from front-matter keep the configured default.
    assert_eq!(output.meta.description, "Default description");
    assert!(output.html.contains("<title>My Post</title>"));
    assert!(output.html.contains(r#"<meta name="description" content="Default description">"#));
}

#[tokio::test]
async fn canonical_falls_back_to_url() {
    let text = "---\nurl: https://blog.example/post\n---\nbody\n";
    let output = convert_default(text).await;

    assert_eq!(output.meta.canonical, "https://blog.example/post");
    assert!(output
        .html
        .contains(r#"<link rel="canonical" href="https://blog.example/post">"#));
}

#[tokio::test]
async fn malformed_front_matter_is_reported_not_fatal() {
    let output = convert_default("---\ntitle: [unclosed\n---\n# Still renders\n").await;

    assert!(output.front_matter_error.is_some());
    assert_eq!(output.meta.title, "Untitled");
    assert!(output.html.contains(">Still renders</h1>"));
}

// ── Rendering and assembly ──────────────────────────────────────────────────

#[tokio::test]
async fn heading_gets_anchor_and_date_subtitle() {
    let text = "---\ntitle: Hello\ndate: 2024-01-02\n---\n# Hi there\n\nParagraph.\n";
    let output = convert_default(text).await;

    assert!(output.html.contains("<h1 id=\"hi-there\">Hi there</h1>"));
    assert!(output
        .html
        .contains("</h1>\n<p class=\"post-date\">2024-01-02</p>"));
    assert_page_quality(&output.html, "date-subtitle");
}

#[tokio::test]
async fn no_date_means_no_subtitle_paragraph() {
    let output = convert_default("# Title\n\ntext\n").await;
    assert!(!output.html.contains("class=\"post-date\">20"));
}

#[tokio::test]
async fn front_matter_values_cannot_inject_markup() {
    let text = "---\ntitle: \"<script>alert(1)</script>\"\n---\nbody\n";
    let output = convert_default(text).await;

    assert!(!output.html.contains("<script>alert(1)"));
    assert!(output
        .html
        .contains("<title>&lt;script&gt;alert(1)&lt;/script&gt;</title>"));
}

#[tokio::test]
async fn math_toggle_removes_mathjax() {
    let config = ConversionConfig::builder().include_math(false).build().unwrap();
    let output = convert("$x^2$\n", &config).await.unwrap();
    assert!(!output.html.contains("MathJax"));

    let with_math = convert_default("$x^2$\n").await;
    assert!(with_math.html.contains("MathJax.Hub.Config"));
}

// ── Caption-only image mode ──────────────────────────────────────────────────

#[tokio::test]
async fn captioned_image_becomes_figure() {
    let output = convert_default("![A red panda](panda.jpg)\n").await;

    assert!(output.html.contains("<figure class=\"image-caption\">"));
    assert!(output.html.contains("<figcaption>A red panda</figcaption>"));
    // Promotion: the figure must not remain inside the paragraph.
    assert!(!output.html.contains("<p><figure"));
    assert_eq!(output.stats.images_found, 1);
    assert_eq!(output.stats.images_rewritten, 1);
}

#[tokio::test]
async fn title_attribute_wins_over_alt_for_caption() {
    let output = convert_default("![alt text](a.png \"Title caption\")\n").await;
    assert!(output.html.contains("<figcaption>Title caption</figcaption>"));
    assert!(!output.html.contains("<figcaption>alt text</figcaption>"));
}

#[tokio::test]
async fn uncaptioned_image_is_untouched() {
    let output = convert_default("![](plain.png)\n").await;
    assert!(!output.html.contains("<figure"));
    assert!(output.html.contains("src=\"plain.png\""));
    assert_eq!(output.stats.images_rewritten, 0);
}

#[tokio::test]
async fn urls_in_captions_are_linkified() {
    let output = convert_default("![Source: https://example.net/data.](chart.png)\n").await;
    assert!(
        output
            .html
            .contains(r#"<a href="https://example.net/data" rel="noopener noreferrer" target="_blank">"#),
        "got: {}",
        output.html
    );
    // The trailing period stays outside the anchor.
    assert!(output.html.contains("</a>.</figcaption>"));
}

#[tokio::test]
async fn existing_figures_pass_through_unchanged() {
    // Raw HTML blocks flow through the renderer untouched; a second caption
    // pass over already-wrapped markup must not nest figures.
    let text = "<figure class=\"image-caption\"><img src=\"a.png\" alt=\"A\">\
<figcaption>A</figcaption></figure>\n\n![New](b.png)\n";
    let output = convert_default(text).await;

    assert_eq!(output.html.matches("<figure").count(), 2);
    assert!(!output.html.contains("<figure class=\"image-caption\"><figure"));
    assert_eq!(output.stats.images_found, 1, "wrapped image must be skipped");
}

// ── Materialize image mode ───────────────────────────────────────────────────

#[tokio::test]
async fn materialize_writes_resized_png_and_rewrites_src() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src_path = dir.path().join("photo.png");
    write_test_png(&src_path, 64, 48);

    let image_dir = dir.path().join("site").join("images");
    let config = ConversionConfig::builder()
        .image_mode(ImageMode::Materialize)
        .image_dir(&image_dir)
        .image_size(16, 12)
        .build()
        .unwrap();

    let text = format!("![A photo]({})\n", src_path.display());
    let output = convert(&text, &config).await.expect("conversion should succeed");

    assert_eq!(output.stats.images_found, 1);
    assert_eq!(output.stats.images_rewritten, 1);
    assert_eq!(output.stats.images_failed, 0);

    let written = output.images[0]
        .written
        .as_deref()
        .expect("asset file name must be recorded");
    assert!(written.starts_with("photo-"));
    assert!(written.ends_with(".png"));

    // The page points at the asset via the src prefix, not the original path.
    assert!(output.html.contains(&format!("src=\"images/{written}\"")));
    assert!(!output.html.contains(&src_path.display().to_string()));
    assert!(output.html.contains("<figcaption>A photo</figcaption>"));

    // The written file decodes to exactly the configured resolution.
    let bytes = std::fs::read(image_dir.join(written)).expect("asset must exist on disk");
    let img = image::load_from_memory(&bytes).expect("asset must be a valid image");
    assert_eq!((img.width(), img.height()), (16, 12));
}

#[tokio::test]
async fn broken_image_is_isolated_not_fatal() {
    let dir = tempfile::tempdir().expect("tempdir");
    let good = dir.path().join("good.png");
    write_test_png(&good, 32, 32);
    let missing = dir.path().join("missing.png");

    let config = ConversionConfig::builder()
        .image_mode(ImageMode::Materialize)
        .image_dir(dir.path().join("images"))
        .image_size(8, 8)
        .build()
        .unwrap();

    let text = format!(
        "![Good]({})\n\n![Bad]({})\n",
        good.display(),
        missing.display()
    );
    let output = convert(&text, &config).await.expect("one bad image must not abort");

    assert_eq!(output.stats.images_found, 2);
    assert_eq!(output.stats.images_rewritten, 1);
    assert_eq!(output.stats.images_failed, 1);

    let failed = output
        .images
        .iter()
        .find(|o| o.error.is_some())
        .expect("failure must be recorded");
    assert_eq!(failed.src, missing.display().to_string());
    // The broken reference keeps its original markup.
    assert!(output.html.contains(&format!("src=\"{}\"", missing.display())));
}

#[tokio::test]
async fn duplicate_sources_share_one_asset() {
    let dir = tempfile::tempdir().expect("tempdir");
    let src_path = dir.path().join("logo.png");
    write_test_png(&src_path, 20, 20);
    let image_dir = dir.path().join("images");

    let config = ConversionConfig::builder()
        .image_mode(ImageMode::Materialize)
        .image_dir(&image_dir)
        .image_size(10, 10)
        .build()
        .unwrap();

    let text = format!(
        "![First]({p})\n\n![Second]({p})\n",
        p = src_path.display()
    );
    let output = convert(&text, &config).await.unwrap();

    assert_eq!(output.stats.images_found, 2);
    assert_eq!(output.stats.images_rewritten, 2);

    let files: Vec<_> = std::fs::read_dir(&image_dir)
        .expect("image dir must exist")
        .collect();
    assert_eq!(files.len(), 1, "one source must yield one asset file");
}

// ── File conversion and serialisation ───────────────────────────────────────

#[tokio::test]
async fn convert_file_writes_complete_page() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("post.md");
    let output_path = dir.path().join("out").join("post.html");
    std::fs::write(&input, "---\ntitle: Hello\n---\n# Hi\n").expect("write input");

    let output = convert_file(&input, &output_path, &ConversionConfig::default())
        .await
        .expect("file conversion should succeed");

    let on_disk = std::fs::read_to_string(&output_path).expect("output must exist");
    assert_eq!(on_disk, output.html);
    assert!(on_disk.contains("<title>Hello</title>"));
    assert!(on_disk.contains(">Hi</h1>"));
    assert_page_quality(&on_disk, "convert_file");

    // No temp file left behind.
    assert!(!dir.path().join("out").join("post.html.tmp").exists());
}

#[tokio::test]
async fn output_round_trips_through_json() {
    let output = convert_default("---\ntitle: T\n---\n![A](a.png)\n").await;

    let json = serde_json::to_string_pretty(&output).expect("must serialise");
    let back: md2page::ConversionOutput =
        serde_json::from_str(&json).expect("must deserialise");

    assert_eq!(back.meta.title, output.meta.title);
    assert_eq!(back.images.len(), output.images.len());
    assert_eq!(back.stats.images_found, output.stats.images_found);
}
