//! Markdown request dispatcher.

use std::sync::Arc;

use axum::http::Request;
use axum::response::{IntoResponse, Response};
use mdserve_document::RenderedFile;
use mdserve_renderer::RenderPipeline;
use mdserve_storage::FileSystem;

use crate::error::ServerError;
use crate::middleware::MarkdownLayer;
use crate::render::{PageRenderer, TemplateRenderer};
use crate::resolver::{self, Resolved};
use crate::static_files::StaticFiles;

/// Handler that renders Markdown files from a [`FileSystem`].
///
/// For each request the prefix is stripped from the path and the file is
/// resolved (see below), its front matter parsed, and the result passed to
/// the [`PageRenderer`]:
///
/// | resolves to | response |
/// |---|---|
/// | missing path, or outside the prefix | 404 |
/// | file not ending in `.md` | 403 |
/// | directory with `index.md` | that document |
/// | directory without `index.md` | static file fallback |
/// | open, stat or read failure | 500 naming the path |
///
/// Cloning is cheap; all state is shared.
#[derive(Clone)]
pub struct Markdown {
    prefix: Arc<str>,
    fs: Arc<dyn FileSystem>,
    pipeline: Arc<RenderPipeline>,
    renderer: Arc<dyn PageRenderer>,
    fallback: StaticFiles,
}

impl Markdown {
    /// Serve Markdown from `fs` under the URL `prefix`, rendering pages with
    /// the default [`TemplateRenderer`].
    pub fn new(
        prefix: impl Into<String>,
        fs: Arc<dyn FileSystem>,
        pipeline: Arc<RenderPipeline>,
    ) -> Self {
        let prefix: String = prefix.into();
        Self {
            fallback: StaticFiles::new(Arc::clone(&fs), prefix.clone()),
            prefix: prefix.into(),
            fs,
            pipeline,
            renderer: Arc::new(TemplateRenderer::default()),
        }
    }

    /// Replace the page renderer.
    #[must_use]
    pub fn with_renderer(mut self, renderer: impl PageRenderer + 'static) -> Self {
        self.renderer = Arc::new(renderer);
        self
    }

    /// URL prefix stripped from request paths.
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Layer that sends `.md` requests here and everything else to the
    /// wrapped service.
    pub fn layer(&self) -> MarkdownLayer {
        MarkdownLayer::new(self.clone())
    }

    /// Handle a request.
    pub fn serve<B>(&self, req: Request<B>) -> Response {
        let (parts, _body) = req.into_parts();

        match self.load(parts.uri.path()) {
            Ok(Some(file)) => self.renderer.render(&parts, &file),
            Ok(None) => self.fallback.serve(&Request::from_parts(parts, ())),
            Err(err) => err.into_response(),
        }
    }

    /// Resolve and parse the document for a request path.
    ///
    /// Returns `None` when the request should be served as static files.
    fn load(&self, uri_path: &str) -> Result<Option<RenderedFile>, ServerError> {
        match resolver::resolve(self.fs.as_ref(), uri_path, &self.prefix)? {
            Resolved::Fallback => Ok(None),
            Resolved::Markdown {
                path,
                mut handle,
                info,
            } => {
                let file =
                    RenderedFile::load(path, info, handle.as_mut(), Arc::clone(&self.pipeline))?;
                tracing::debug!(path = %file.path(), title = %file.title(), "Loaded document");
                Ok(Some(file))
            }
        }
    }
}

impl std::fmt::Debug for Markdown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Markdown")
            .field("prefix", &self.prefix)
            .finish_non_exhaustive()
    }
}
