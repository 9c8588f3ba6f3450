//! Markdown to sanitized HTML pipeline.
//!
//! This crate turns raw Markdown bytes into a `(toc, body)` pair of HTML
//! fragments ready to be dropped into a page template.
//!
//! # Architecture
//!
//! The [`RenderPipeline`] composes two pluggable capabilities:
//! - [`MarkdownEngine`]: Markdown to HTML, optionally emitting a `<nav>` table of
//!   contents ahead of the document ([`CmarkEngine`] by default)
//! - [`HtmlSanitizer`]: strips disallowed markup from the document body
//!   ([`AmmoniaSanitizer`] by default)
//!
//! The pipeline splits the engine output at the first `</nav>`, rewrites the
//! table of contents markup with navigation classes and sanitizes the body.
//!
//! # Example
//!
//! ```
//! use mdserve_renderer::RenderPipeline;
//!
//! let pipeline = RenderPipeline::standard(None)?;
//! let html = pipeline.render(b"# Hello\n\nWorld <script>alert(1)</script>");
//!
//! assert!(html.toc.contains(r##"<a class="nav-link" href="#hello">"##));
//! assert!(html.body.contains(r#"<h1 id="hello">"#));
//! assert!(!html.body.contains("<script>"));
//! # Ok::<(), mdserve_renderer::RenderError>(())
//! ```

mod engine;
mod error;
mod heading;
mod highlight;
mod pipeline;
mod sanitize;
mod toc;
mod util;

pub use engine::{CmarkEngine, MarkdownEngine, RenderOptions};
pub use error::RenderError;
pub use heading::{TocEntry, slugify};
pub use highlight::{DEFAULT_THEME, Highlighter};
pub use pipeline::{RenderPipeline, RenderedHtml};
pub use sanitize::{AmmoniaSanitizer, HtmlSanitizer, SanitizePolicy};
pub use toc::rewrite_toc;
pub use util::escape_html;
