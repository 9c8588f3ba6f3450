//! Table of contents markup.
//!
//! The engine emits the table of contents as a `<nav>` block of nested
//! lists ahead of the document. The pipeline later strips the wrapper and
//! decorates the lists with navigation classes via [`rewrite_toc`].

use std::fmt::Write;

use crate::heading::TocEntry;
use crate::util::escape_html;

/// Marker that opens the table of contents fragment.
pub(crate) const TOC_START: &str = "<nav>";

/// Marker that ends the table of contents fragment.
pub(crate) const TOC_END: &str = "</nav>";

/// Literal replacements applied to the table of contents, in priority order.
const TOC_REPLACEMENTS: &[(&str, &str)] = &[
    ("<nav>", ""),
    ("<ul>", r#"<ul class="nav flex-column">"#),
    ("<li>", r#"<li class="nav-item">"#),
    ("<a ", r#"<a class="nav-link" "#),
];

/// Render table of contents entries as a `<nav>` block of nested lists.
///
/// List depth follows heading depth relative to the shallowest heading.
/// Skipped levels get an empty list item so the markup stays balanced.
/// Returns an empty string when there are no entries.
pub(crate) fn render_nav(entries: &[TocEntry]) -> String {
    let Some(base) = entries.iter().map(|e| e.level).min() else {
        return String::new();
    };

    let mut out = String::from(TOC_START);
    out.push('\n');
    let mut depth = 0usize;

    for entry in entries {
        let target = usize::from(entry.level - base) + 1;

        if depth == 0 {
            out.push_str("<ul>\n");
            depth = 1;
        } else if target > depth {
            out.push_str("\n<ul>\n");
            depth += 1;
        } else {
            out.push_str("</li>\n");
            while depth > target {
                out.push_str("</ul>\n</li>\n");
                depth -= 1;
            }
        }

        while depth < target {
            out.push_str("<li>\n<ul>\n");
            depth += 1;
        }

        write!(
            out,
            r##"<li><a href="#{}">{}</a>"##,
            escape_html(&entry.id),
            escape_html(&entry.title)
        )
        .unwrap();
    }

    out.push_str("</li>\n");
    while depth > 1 {
        out.push_str("</ul>\n</li>\n");
        depth -= 1;
    }
    out.push_str("</ul>\n");
    out.push_str(TOC_END);
    out.push('\n');
    out
}

/// Rewrite a table of contents fragment for presentation.
///
/// Removes `<nav>` wrapper tags and adds navigation classes to `<ul>`, `<li>`
/// and `<a>` elements. Matching is a single left-to-right pass over the
/// input, so inserted text is never matched again.
///
/// # Examples
///
/// ```
/// use mdserve_renderer::rewrite_toc;
///
/// assert_eq!(
///     rewrite_toc(r##"<nav><ul><li><a href="#a">A</a></li></ul>"##),
///     r##"<ul class="nav flex-column"><li class="nav-item"><a class="nav-link" href="#a">A</a></li></ul>"##
/// );
/// ```
pub fn rewrite_toc(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len() + fragment.len() / 2);
    let mut rest = fragment;

    'scan: while !rest.is_empty() {
        for (from, to) in TOC_REPLACEMENTS {
            if let Some(tail) = rest.strip_prefix(from) {
                out.push_str(to);
                rest = tail;
                continue 'scan;
            }
        }

        let mut chars = rest.chars();
        if let Some(c) = chars.next() {
            out.push(c);
        }
        rest = chars.as_str();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn entry(level: u8, title: &str) -> TocEntry {
        TocEntry {
            level,
            title: title.to_owned(),
            id: crate::slugify(title),
        }
    }

    #[test]
    fn test_render_nav_empty() {
        assert_eq!(render_nav(&[]), "");
    }

    #[test]
    fn test_render_nav_flat() {
        let nav = render_nav(&[entry(2, "One"), entry(2, "Two")]);

        assert_eq!(
            nav,
            "<nav>\n<ul>\n<li><a href=\"#one\">One</a></li>\n<li><a href=\"#two\">Two</a></li>\n</ul>\n</nav>\n"
        );
    }

    #[test]
    fn test_render_nav_nested() {
        let nav = render_nav(&[entry(1, "Top"), entry(2, "Child"), entry(1, "Next")]);

        assert_eq!(
            nav,
            "<nav>\n<ul>\n<li><a href=\"#top\">Top</a>\n<ul>\n<li><a href=\"#child\">Child</a></li>\n</ul>\n</li>\n<li><a href=\"#next\">Next</a></li>\n</ul>\n</nav>\n"
        );
    }

    #[test]
    fn test_render_nav_skipped_level_is_balanced() {
        let nav = render_nav(&[entry(1, "Top"), entry(3, "Deep")]);

        assert_eq!(nav.matches("<ul>").count(), nav.matches("</ul>").count());
        assert_eq!(nav.matches("<li>").count(), nav.matches("</li>").count());
    }

    #[test]
    fn test_render_nav_starts_deeper_than_base() {
        let nav = render_nav(&[entry(3, "Deep"), entry(2, "Shallow")]);

        assert_eq!(nav.matches("<ul>").count(), nav.matches("</ul>").count());
        assert_eq!(nav.matches("<li>").count(), nav.matches("</li>").count());
        assert!(nav.ends_with("</ul>\n</nav>\n"));
    }

    #[test]
    fn test_render_nav_escapes_title() {
        let nav = render_nav(&[entry(2, "<b>&")]);

        assert!(nav.contains("&lt;b&gt;&amp;"));
    }

    #[test]
    fn test_rewrite_toc_strips_nav() {
        assert_eq!(rewrite_toc("<nav>\n<ul>\n"), "\n<ul class=\"nav flex-column\">\n");
    }

    #[test]
    fn test_rewrite_toc_does_not_rematch_output() {
        // "<ul class=..." must not be turned into another class-injected tag
        let once = rewrite_toc("<ul><li>");
        assert_eq!(
            once,
            r#"<ul class="nav flex-column"><li class="nav-item">"#
        );
    }

    #[test]
    fn test_rewrite_toc_leaves_closing_tags() {
        assert_eq!(rewrite_toc("</a></li></ul>"), "</a></li></ul>");
    }

    #[test]
    fn test_rewrite_toc_multibyte() {
        assert_eq!(
            rewrite_toc("<a href=\"#größe\">Größe</a>"),
            "<a class=\"nav-link\" href=\"#größe\">Größe</a>"
        );
    }
}
