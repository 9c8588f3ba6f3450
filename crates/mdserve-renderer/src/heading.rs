//! Heading tracking for anchor IDs and the table of contents.

use std::collections::HashMap;

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text.
    pub title: String,
    /// Anchor ID for linking.
    pub id: String,
}

/// State for tracking headings while walking parser events.
#[derive(Default)]
pub(crate) struct HeadingState {
    /// Current heading level being processed (None if not in a heading).
    current_level: Option<u8>,
    /// Explicit `{#id}` given on the current heading.
    explicit_id: Option<String>,
    /// Buffer for heading plain text (for table of contents and slug).
    text: String,
    /// Table of contents entries.
    toc: Vec<TocEntry>,
    /// Counter for generating unique heading IDs.
    id_counts: HashMap<String, usize>,
}

impl HeadingState {
    /// Check if we're currently inside any heading.
    pub(crate) fn is_active(&self) -> bool {
        self.current_level.is_some()
    }

    /// Start tracking a heading.
    pub(crate) fn start_heading(&mut self, level: u8, explicit_id: Option<String>) {
        self.current_level = Some(level);
        self.explicit_id = explicit_id;
        self.text.clear();
    }

    /// Append plain text of the current heading.
    pub(crate) fn push_text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    /// Complete heading and record its table of contents entry.
    ///
    /// Returns the anchor ID, or None if not in a heading.
    pub(crate) fn complete_heading(&mut self) -> Option<String> {
        let level = self.current_level.take()?;
        let text = std::mem::take(&mut self.text);
        let id = match self.explicit_id.take() {
            Some(id) => self.register_id(id),
            None => self.register_id(slugify(&text)),
        };

        self.toc.push(TocEntry {
            level,
            title: text.trim().to_owned(),
            id: id.clone(),
        });

        Some(id)
    }

    /// Take the collected table of contents.
    pub(crate) fn take_toc(&mut self) -> Vec<TocEntry> {
        std::mem::take(&mut self.toc)
    }

    /// Make an ID unique within the document.
    fn register_id(&mut self, base_id: String) -> String {
        let base_id = if base_id.is_empty() {
            "section".to_owned()
        } else {
            base_id
        };
        let count = self.id_counts.entry(base_id.clone()).or_insert(0);
        *count += 1;

        if *count == 1 {
            base_id
        } else {
            format!("{base_id}-{}", *count - 1)
        }
    }
}

/// Convert heading text to an anchor slug.
///
/// Letters and digits are kept (lowercased); every other run of characters
/// becomes a single dash, never leading or trailing.
///
/// # Examples
///
/// ```
/// use mdserve_renderer::slugify;
///
/// assert_eq!(slugify("Hello World"), "hello-world");
/// assert_eq!(slugify("What's New?"), "what-s-new");
/// assert_eq!(slugify("Über Größe"), "über-größe");
/// ```
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !result.is_empty() {
                result.push('-');
            }
            pending_dash = false;
            result.extend(c.to_lowercase());
        } else {
            pending_dash = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Heading"), "heading");
        assert_eq!(slugify("  Spaces  "), "spaces");
        assert_eq!(slugify("Multiple   Spaces"), "multiple-spaces");
        assert_eq!(slugify("kebab-case"), "kebab-case");
        assert_eq!(slugify("snake_case"), "snake-case");
        assert_eq!(slugify("v1.2 Release"), "v1-2-release");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_duplicate_ids_get_suffix() {
        let mut state = HeadingState::default();

        for _ in 0..3 {
            state.start_heading(2, None);
            state.push_text("Usage");
            state.complete_heading();
        }

        let ids: Vec<_> = state.take_toc().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["usage", "usage-1", "usage-2"]);
    }

    #[test]
    fn test_explicit_id_wins() {
        let mut state = HeadingState::default();

        state.start_heading(1, Some("custom".to_owned()));
        state.push_text("Title");
        let id = state.complete_heading();

        assert_eq!(id.as_deref(), Some("custom"));
    }

    #[test]
    fn test_empty_heading_gets_fallback_id() {
        let mut state = HeadingState::default();

        state.start_heading(2, None);
        let id = state.complete_heading();

        assert_eq!(id.as_deref(), Some("section"));
    }

    #[test]
    fn test_complete_without_start_is_none() {
        let mut state = HeadingState::default();

        assert!(!state.is_active());
        assert!(state.complete_heading().is_none());
    }

    #[test]
    fn test_toc_entry_trims_title() {
        let mut state = HeadingState::default();

        state.start_heading(3, None);
        state.push_text(" Spaced ");
        state.complete_heading();

        let toc = state.take_toc();
        assert_eq!(
            toc,
            vec![TocEntry {
                level: 3,
                title: "Spaced".to_owned(),
                id: "spaced".to_owned(),
            }]
        );
    }
}
