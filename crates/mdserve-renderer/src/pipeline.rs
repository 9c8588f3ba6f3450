//! Engine plus sanitizer composition.

use crate::engine::{CmarkEngine, MarkdownEngine, RenderOptions};
use crate::error::RenderError;
use crate::highlight::{DEFAULT_THEME, Highlighter};
use crate::sanitize::{AmmoniaSanitizer, HtmlSanitizer, SanitizePolicy};
use crate::toc::{TOC_END, TOC_START, rewrite_toc};

/// Rendered document split into navigation and content.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderedHtml {
    /// Table of contents with navigation classes, empty if the document
    /// has no headings or the table of contents is disabled.
    pub toc: String,
    /// Sanitized document HTML.
    pub body: String,
}

/// Markdown rendering pipeline.
///
/// The table of contents is built by the engine from heading text it has
/// already escaped, so only the body goes through the sanitizer. Output is
/// split only when a table of contents was requested and the engine put one
/// at offset zero; otherwise everything is sanitized as body.
pub struct RenderPipeline {
    engine: Box<dyn MarkdownEngine>,
    sanitizer: Box<dyn HtmlSanitizer>,
    options: RenderOptions,
}

impl RenderPipeline {
    /// Compose a pipeline from an engine and a sanitizer.
    pub fn new(engine: impl MarkdownEngine + 'static, sanitizer: impl HtmlSanitizer + 'static) -> Self {
        Self {
            engine: Box::new(engine),
            sanitizer: Box::new(sanitizer),
            options: RenderOptions::default(),
        }
    }

    /// Pipeline with [`CmarkEngine`], syntect highlighting and the default
    /// [`SanitizePolicy`].
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownTheme`] if `theme` is not a bundled theme.
    pub fn standard(theme: Option<&str>) -> Result<Self, RenderError> {
        let highlighter = Highlighter::new(theme.unwrap_or(DEFAULT_THEME))?;
        Ok(Self::new(
            CmarkEngine::new().with_highlighter(highlighter),
            AmmoniaSanitizer::new(&SanitizePolicy::default()),
        ))
    }

    /// Set conversion options.
    #[must_use]
    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable or disable the table of contents.
    #[must_use]
    pub fn with_toc(mut self, toc: bool) -> Self {
        self.options.toc = toc;
        self
    }

    /// Current conversion options.
    pub fn options(&self) -> RenderOptions {
        self.options
    }

    /// Render Markdown bytes to a table of contents and a sanitized body.
    pub fn render(&self, source: &[u8]) -> RenderedHtml {
        let html = self.engine.to_html(source, &self.options);

        let toc_end = if self.options.toc && html.starts_with(TOC_START) {
            html.find(TOC_END)
        } else {
            None
        };
        let Some(pos) = toc_end else {
            return RenderedHtml {
                toc: String::new(),
                body: self.sanitizer.sanitize(&html),
            };
        };

        let toc = &html[..pos];
        // One separator character follows the marker.
        let mut rest = html[pos + TOC_END.len()..].chars();
        rest.next();

        RenderedHtml {
            toc: rewrite_toc(toc),
            body: self.sanitizer.sanitize(rest.as_str()),
        }
    }
}

impl std::fmt::Debug for RenderPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderPipeline")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
