//! Styled stderr output for the CLI.

use std::fmt::Display;

use console::{Style, Term};

/// Writes CLI status lines to stderr so stdout stays free for rendered HTML.
pub(crate) struct Output {
    term: Term,
    red: Style,
    cyan_bold: Style,
    dim: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
            dim: Style::new().dim(),
        }
    }

    /// Plain status line.
    pub(crate) fn info(&self, msg: &str) {
        let _ = self.term.write_line(msg);
    }

    /// `label: value` line with a dimmed label.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        let _ = self
            .term
            .write_line(&format!("{} {value}", self.dim.apply_to(format!("{label}:"))));
    }

    /// Error line in red.
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Headline, used for the listening address.
    pub(crate) fn highlight(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&self.cyan_bold.apply_to(msg).to_string());
    }
}
