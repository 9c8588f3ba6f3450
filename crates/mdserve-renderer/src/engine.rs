//! Markdown to HTML conversion.
//!
//! [`CmarkEngine`] walks pulldown-cmark events once, tracking state for
//! headings and code blocks:
//! - `HeadingState`: assigns unique anchor IDs and collects the table of contents
//! - `CodeBlockState`: buffers fenced code so it can be handed to the highlighter
//!
//! Everything else is passed through to pulldown-cmark's HTML writer.

use pulldown_cmark::{CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, html};

use crate::heading::HeadingState;
use crate::highlight::Highlighter;
use crate::toc::{TOC_START, render_nav};
use crate::util::{escape_html, heading_level_to_num};

/// Options for a single conversion.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RenderOptions {
    /// Emit a `<nav>` table of contents ahead of the document.
    pub toc: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { toc: true }
    }
}

/// Markdown to HTML capability.
///
/// When `options.toc` is set and the document has headings, implementations
/// must emit the table of contents first, opened by `<nav>` at offset zero
/// and terminated by `</nav>` and one separator byte, followed by the
/// document HTML. Output must start with `<nav>` only when a table of
/// contents was generated; document HTML that would otherwise begin with
/// `<nav>` has to be shifted off offset zero.
pub trait MarkdownEngine: Send + Sync {
    /// Convert raw Markdown bytes to HTML.
    fn to_html(&self, source: &[u8], options: &RenderOptions) -> String;
}

/// Parser extensions enabled for every document.
const PARSER_OPTIONS: Options = Options::ENABLE_TABLES
    .union(Options::ENABLE_FOOTNOTES)
    .union(Options::ENABLE_STRIKETHROUGH)
    .union(Options::ENABLE_TASKLISTS)
    .union(Options::ENABLE_HEADING_ATTRIBUTES);

/// CommonMark engine built on pulldown-cmark with optional highlighting.
#[derive(Debug, Default)]
pub struct CmarkEngine {
    highlighter: Option<Highlighter>,
}

impl CmarkEngine {
    /// Create an engine without syntax highlighting.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlight fenced code blocks with a known language.
    #[must_use]
    pub fn with_highlighter(mut self, highlighter: Highlighter) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Language of a fenced block, when a highlighter is configured.
    fn highlight_language(&self, kind: &CodeBlockKind<'_>) -> Option<String> {
        self.highlighter.as_ref()?;
        match kind {
            CodeBlockKind::Fenced(info) => {
                let lang = info.split_whitespace().next()?;
                Some(lang.to_owned())
            }
            CodeBlockKind::Indented => None,
        }
    }

    fn render_code_block(&self, lang: &str, code: &str) -> String {
        self.highlighter
            .as_ref()
            .and_then(|h| h.highlight(lang, code))
            .unwrap_or_else(|| {
                format!(
                    r#"<pre><code class="language-{}">{}</code></pre>"#,
                    escape_html(lang),
                    escape_html(code)
                ) + "\n"
            })
    }
}

/// State for buffering a fenced code block.
#[derive(Default)]
struct CodeBlockState {
    /// Language of current code block, set while buffering.
    language: Option<String>,
    /// Buffer for code block content.
    buffer: String,
}

impl CodeBlockState {
    fn is_active(&self) -> bool {
        self.language.is_some()
    }

    fn start(&mut self, language: String) {
        self.language = Some(language);
        self.buffer.clear();
    }

    fn end(&mut self) -> Option<(String, String)> {
        let lang = self.language.take()?;
        Some((lang, std::mem::take(&mut self.buffer)))
    }
}

impl MarkdownEngine for CmarkEngine {
    fn to_html(&self, source: &[u8], options: &RenderOptions) -> String {
        let text = String::from_utf8_lossy(source);
        let mut heading = HeadingState::default();
        let mut code = CodeBlockState::default();
        let mut heading_start: Option<usize> = None;
        let mut events: Vec<Event<'_>> = Vec::new();

        for event in Parser::new_ext(&text, PARSER_OPTIONS) {
            match event {
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    heading.start_heading(heading_level_to_num(level), id.map(|s| s.to_string()));
                    heading_start = Some(events.len());
                    events.push(Event::Start(Tag::Heading {
                        level,
                        id: None,
                        classes,
                        attrs,
                    }));
                }
                Event::End(TagEnd::Heading(level)) => {
                    if let Some(index) = heading_start.take()
                        && let Some(anchor) = heading.complete_heading()
                        && let Some(Event::Start(Tag::Heading { id, .. })) = events.get_mut(index)
                    {
                        *id = Some(CowStr::from(anchor));
                    }
                    events.push(Event::End(TagEnd::Heading(level)));
                }
                Event::Start(Tag::CodeBlock(kind)) => match self.highlight_language(&kind) {
                    Some(lang) => code.start(lang),
                    None => events.push(Event::Start(Tag::CodeBlock(kind))),
                },
                Event::End(TagEnd::CodeBlock) => match code.end() {
                    Some((lang, content)) => {
                        let html = self.render_code_block(&lang, &content);
                        events.push(Event::Html(CowStr::from(html)));
                    }
                    None => events.push(Event::End(TagEnd::CodeBlock)),
                },
                Event::Text(text) if code.is_active() => code.buffer.push_str(&text),
                Event::Text(text) if heading.is_active() => {
                    heading.push_text(&text);
                    events.push(Event::Text(text));
                }
                Event::Code(text) if heading.is_active() => {
                    heading.push_text(&text);
                    events.push(Event::Code(text));
                }
                other => events.push(other),
            }
        }

        let mut body = String::with_capacity(text.len() * 3 / 2);
        html::push_html(&mut body, events.into_iter());

        let nav = if options.toc {
            render_nav(&heading.take_toc())
        } else {
            String::new()
        };
        if nav.is_empty() {
            // Raw HTML at the top of the document must not pose as a TOC.
            if body.starts_with(TOC_START) {
                body.insert(0, '\n');
            }
            return body;
        }

        let mut out = nav;
        out.push_str(&body);
        out
    }
}
