//! Syntax highlighting for fenced code blocks.
//!
//! Wraps syntect to produce inline-styled `<pre>`/`<span style="...">` markup,
//! which survives sanitization as long as `style` is allowed on `span`.

use syntect::highlighting::{Theme, ThemeSet};
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

use crate::error::RenderError;

/// Theme used when none is configured.
pub const DEFAULT_THEME: &str = "InspiredGitHub";

/// Code highlighter backed by syntect's bundled syntaxes and themes.
pub struct Highlighter {
    syntaxes: SyntaxSet,
    theme: Theme,
}

impl Highlighter {
    /// Create a highlighter using one of syntect's bundled themes.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::UnknownTheme`] if no bundled theme has that name.
    pub fn new(theme_name: &str) -> Result<Self, RenderError> {
        let mut themes = ThemeSet::load_defaults();
        let theme = themes
            .themes
            .remove(theme_name)
            .ok_or_else(|| RenderError::UnknownTheme(theme_name.to_owned()))?;

        Ok(Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme,
        })
    }

    /// Highlight `code` written in `language`.
    ///
    /// Returns `None` if the language is unknown or highlighting fails, in
    /// which case the caller should fall back to a plain code block.
    pub fn highlight(&self, language: &str, code: &str) -> Option<String> {
        let syntax = self.syntaxes.find_syntax_by_token(language)?;
        match highlighted_html_for_string(code, &self.syntaxes, syntax, &self.theme) {
            Ok(html) => Some(html),
            Err(err) => {
                tracing::debug!(language, error = %err, "Highlighting failed");
                None
            }
        }
    }
}

impl std::fmt::Debug for Highlighter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highlighter")
            .field("theme", &self.theme.name)
            .finish_non_exhaustive()
    }
}
