//! Static style and script fragments injected by the document assembler.
//!
//! Centralising every fragment here serves two purposes:
//!
//! 1. **Single source of truth** — tweaking the page styling or the math
//!    renderer configuration requires editing exactly one place.
//!
//! 2. **Testability** — unit tests can assert against the constants directly
//!    without rendering a whole document.
//!
//! The fragments are process-wide read-only configuration; whether each one
//! is injected is decided by [`crate::config::ConversionConfig`].

/// Base stylesheet embedded in every generated page.
pub const BASE_STYLE: &str = r#"body { font-family: Arial, sans-serif; line-height: 1.6; max-width: 800px; margin: 0 auto; padding: 20px; }
img { max-width: 100%; height: auto; }
pre { background-color: #f4f4f4; padding: 15px; border-radius: 5px; overflow-x: auto; }
blockquote { border-left: 4px solid #ddd; padding-left: 15px; color: #666; }
code { background-color: #f4f4f4; padding: 2px 4px; border-radius: 3px; }
input[type="checkbox"] { margin-right: 8px; }
.task-list-item { list-style-type: none; }
p.post-date { color: #888; font-size: 0.9em; margin-top: -0.5em; }"#;

/// Styling for captioned figures, injected when figure styles are enabled.
pub const FIGURE_STYLE: &str = r#"figure.image-caption { margin: 1em 0; text-align: center; }
figure.image-caption img { display: block; margin: 0 auto; }
figure.image-caption figcaption { color: #666; font-size: 0.9em; margin-top: 0.5em; text-align: center; }"#;

/// Math-specific styling, injected together with the MathJax loader so a
/// math-free page carries no trace of the renderer.
pub const MATH_STYLE: &str = r#".MathJax { font-size: 1.1em; }"#;

/// MathJax configuration plus async loader, injected when math is enabled.
pub const MATHJAX_SNIPPET: &str = r#"<script type="text/x-mathjax-config">
    MathJax.Hub.Config({
        tex2jax: {
            inlineMath: [['$', '$'], ['\\(', '\\)']],
            displayMath: [['$$', '$$'], ['\\[', '\\]']],
            processEscapes: true
        },
        "HTML-CSS": {
            linebreaks: { automatic: true },
            availableFonts: ["STIX"],
            preferredFont: "STIX",
            webFont: "STIX-Web",
            imageFont: null,
            undefinedFamily: "STIXGeneral,'Arial Unicode MS',serif"
        }
    });
</script>
<script type="text/javascript" async
    src="https://cdnjs.cloudflare.com/ajax/libs/mathjax/2.7.7/MathJax.js?config=TeX-AMS-MML_HTMLorMML">
</script>"#;
