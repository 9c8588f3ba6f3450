//! A loaded Markdown document with a render-once cache.

use std::io::{Read, Seek};
use std::sync::{Arc, OnceLock};
use std::time::SystemTime;

use mdserve_renderer::{RenderPipeline, RenderedHtml};
use mdserve_storage::FileInfo;

use crate::attributes::Attributes;
use crate::error::DocumentError;
use crate::front_matter::{self, FrontMatter};
use crate::title::title_from_filename;

/// Markdown document ready to be rendered.
///
/// Everything except the rendered HTML is fixed at construction. The HTML is
/// produced by the pipeline on first access to [`html`](Self::html),
/// [`toc`](Self::toc) or [`body`](Self::body); concurrent first callers wait
/// for a single render and all later calls return the cached result.
#[derive(Debug)]
pub struct RenderedFile {
    path: String,
    title: String,
    info: FileInfo,
    content: Vec<u8>,
    attributes: Attributes,
    pipeline: Arc<RenderPipeline>,
    rendered: OnceLock<RenderedHtml>,
}

impl RenderedFile {
    /// Read a document from `reader`, splitting off its front matter.
    ///
    /// # Errors
    ///
    /// Returns [`DocumentError::Read`] if the stream cannot be read.
    pub fn load<R: Read + Seek + ?Sized>(
        path: impl Into<String>,
        info: FileInfo,
        reader: &mut R,
        pipeline: Arc<RenderPipeline>,
    ) -> Result<Self, DocumentError> {
        let path = path.into();
        match front_matter::parse(reader) {
            Ok(front_matter) => Ok(Self::new(path, info, front_matter, pipeline)),
            Err(source) => Err(DocumentError::Read { path, source }),
        }
    }

    /// Build a document from already parsed parts.
    pub fn new(
        path: impl Into<String>,
        info: FileInfo,
        front_matter: FrontMatter,
        pipeline: Arc<RenderPipeline>,
    ) -> Self {
        let FrontMatter {
            attributes,
            content,
        } = front_matter;

        let title = match attributes.get("Title") {
            "" => title_from_filename(&info.name),
            explicit => explicit.to_owned(),
        };

        Self {
            path: path.into(),
            title,
            info,
            content,
            attributes,
            pipeline,
            rendered: OnceLock::new(),
        }
    }

    /// Resolved path relative to the served root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Display title.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// File name as reported by the filesystem.
    pub fn name(&self) -> &str {
        &self.info.name
    }

    /// Metadata captured when the file was opened.
    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    /// Last modification time.
    pub fn modified(&self) -> SystemTime {
        self.info.modified
    }

    /// Markdown source without the front matter block.
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    /// Front matter attributes.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// First value of a front matter attribute, or `""` if missing.
    pub fn get_attr(&self, name: &str) -> &str {
        self.attributes.get(name)
    }

    /// Rendered table of contents and body, rendering on first call.
    pub fn html(&self) -> &RenderedHtml {
        self.rendered.get_or_init(|| {
            tracing::debug!(path = %self.path, "Rendering document");
            self.pipeline.render(&self.content)
        })
    }

    /// Rendered table of contents.
    pub fn toc(&self) -> &str {
        &self.html().toc
    }

    /// Rendered, sanitized body.
    pub fn body(&self) -> &str {
        &self.html().body
    }

    /// True once the HTML has been rendered.
    pub fn is_rendered(&self) -> bool {
        self.rendered.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{Duration, UNIX_EPOCH};

    use mdserve_renderer::{AmmoniaSanitizer, CmarkEngine, MarkdownEngine, RenderOptions};
    use mdserve_storage::{FileSystem, MockFs};

    use super::*;
    use pretty_assertions::assert_eq;

    fn info(name: &str) -> FileInfo {
        FileInfo {
            name: name.to_owned(),
            size: 0,
            mode: 0o644,
            modified: UNIX_EPOCH,
            is_dir: false,
        }
    }

    fn standard() -> Arc<RenderPipeline> {
        Arc::new(RenderPipeline::standard(None).unwrap())
    }

    fn load(name: &str, source: &str, pipeline: Arc<RenderPipeline>) -> RenderedFile {
        let mut reader = Cursor::new(source.as_bytes().to_vec());
        RenderedFile::load(format!("/{name}"), info(name), &mut reader, pipeline).unwrap()
    }

    /// Engine counting conversions, slow enough for callers to overlap.
    struct CountingEngine {
        calls: Arc<AtomicUsize>,
        inner: CmarkEngine,
    }

    impl MarkdownEngine for CountingEngine {
        fn to_html(&self, source: &[u8], options: &RenderOptions) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            std::thread::sleep(Duration::from_millis(20));
            self.inner.to_html(source, options)
        }
    }

    fn counting() -> (Arc<RenderPipeline>, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let engine = CountingEngine {
            calls: Arc::clone(&calls),
            inner: CmarkEngine::new(),
        };
        let pipeline = RenderPipeline::new(engine, AmmoniaSanitizer::default());
        (Arc::new(pipeline), calls)
    }

    #[test]
    fn test_title_from_attribute() {
        let file = load("guide.md", "Title: Hello\n\n# Heading\n", standard());

        assert_eq!(file.title(), "Hello");
        assert_eq!(file.get_attr("title"), "Hello");
        assert_eq!(file.content(), b"# Heading\n");
    }

    #[test]
    fn test_title_from_filename() {
        let file = load("getting_started.md", "# Heading\n", standard());

        assert_eq!(file.title(), "Getting Started");
        assert!(file.attributes().is_empty());
    }

    #[test]
    fn test_empty_title_attribute_is_ignored() {
        let file = load("faq.md", "Title:\n\nbody\n", standard());

        assert_eq!(file.title(), "Faq");
    }

    #[test]
    fn test_body_without_toc_has_no_nav() {
        let pipeline = Arc::new(RenderPipeline::standard(None).unwrap().with_toc(false));
        let file = load("guide.md", "Title: Hello\n\n# Heading\n", pipeline);

        assert!(file.body().contains(r#"<h1 id="heading">Heading</h1>"#));
        assert!(!file.body().contains("<nav>"));
        assert_eq!(file.toc(), "");
    }

    #[test]
    fn test_lazy_render() {
        let (pipeline, calls) = counting();
        let file = load("guide.md", "# A\n", pipeline);

        assert!(!file.is_rendered());
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        let first = file.body().to_owned();
        let toc = file.toc().to_owned();

        assert!(file.is_rendered());
        assert_eq!(file.body(), first);
        assert_eq!(file.toc(), toc);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_first_access_renders_once() {
        let (pipeline, calls) = counting();
        let file = load("guide.md", "# A\n\n## B\n", pipeline);

        let outputs: Vec<String> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|i| {
                    let file = &file;
                    s.spawn(move || {
                        if i % 2 == 0 {
                            file.body().to_owned()
                        } else {
                            file.toc().to_owned()
                        }
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(outputs.iter().step_by(2).all(|o| o == file.body()));
        assert!(outputs.iter().skip(1).step_by(2).all(|o| o == file.toc()));
    }

    #[test]
    fn test_load_from_mock_fs() {
        let fs = MockFs::new()
            .with_file("notes/todo-list.md", "Owner: me\n\n- [ ] thing\n")
            .with_mtime("notes/todo-list.md", 60);
        let mut handle = fs.open("/notes/todo-list.md").unwrap();
        let info = handle.stat().unwrap();

        let file =
            RenderedFile::load("/notes/todo-list.md", info, handle.as_mut(), standard()).unwrap();

        assert_eq!(file.name(), "todo-list.md");
        assert_eq!(file.title(), "Todo List");
        assert_eq!(file.get_attr("owner"), "me");
        assert_eq!(file.modified(), UNIX_EPOCH + Duration::from_secs(60));
    }

    #[test]
    fn test_read_failure() {
        let fs = MockFs::new()
            .with_file("broken.md", "x")
            .with_read_error("broken.md");
        let mut handle = fs.open("broken.md").unwrap();
        let info = handle.stat().unwrap();

        let err = RenderedFile::load("/broken.md", info, handle.as_mut(), standard()).unwrap_err();

        let DocumentError::Read { path, source } = err;
        assert_eq!(path, "/broken.md");
        assert_eq!(source.to_string(), "injected read failure");
    }
}
