//! Page rendering callbacks.
//!
//! A [`PageRenderer`] turns a resolved, parsed document into the HTTP
//! response. [`TemplateRenderer`] is the default and wraps the document in
//! an HTML page; any `Fn(&Parts, &RenderedFile) -> Response` closure can be
//! used instead.

use std::collections::BTreeMap;
use std::time::SystemTime;

use axum::http::header;
use axum::http::request::Parts;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use mdserve_document::RenderedFile;
use minijinja::{Environment, Value, context};

use crate::error::ServerError;
use crate::template::DEFAULT_TEMPLATE;

/// Name the page template is registered under. The `.html` suffix turns on
/// HTML auto-escaping.
const TEMPLATE_NAME: &str = "page.html";

/// Produces the response for a Markdown document.
pub trait PageRenderer: Send + Sync {
    /// Build the response for `file`, requested with `parts`.
    fn render(&self, parts: &Parts, file: &RenderedFile) -> Response;
}

impl<F> PageRenderer for F
where
    F: Fn(&Parts, &RenderedFile) -> Response + Send + Sync,
{
    fn render(&self, parts: &Parts, file: &RenderedFile) -> Response {
        self(parts, file)
    }
}

/// Renders documents into an HTML page template.
///
/// The status and headers are fixed before the template runs. If the
/// template fails part way, the error is logged and whatever was produced
/// so far is sent with status 200.
pub struct TemplateRenderer {
    env: Environment<'static>,
}

impl TemplateRenderer {
    /// Compile a page template.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Template`] if the template has syntax errors.
    pub fn new(source: impl Into<String>) -> Result<Self, ServerError> {
        let mut env = Environment::new();
        env.add_template_owned(TEMPLATE_NAME, source.into())?;
        Ok(Self { env })
    }

    fn execute(&self, file: &RenderedFile, out: &mut Vec<u8>) -> Result<(), minijinja::Error> {
        let meta: BTreeMap<&str, &str> = file
            .attributes()
            .iter()
            .filter_map(|(key, values)| Some((key, values.first()?.as_str())))
            .collect();

        let ctx = context! {
            title => file.title(),
            name => file.name(),
            path => file.path(),
            modified => format_modified(file.modified()),
            toc => Value::from_safe_string(file.toc().to_owned()),
            body => Value::from_safe_string(file.body().to_owned()),
            meta => meta,
        };

        self.env
            .get_template(TEMPLATE_NAME)?
            .render_to_write(ctx, out)?;
        Ok(())
    }
}

impl Default for TemplateRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE).expect("built-in page template is valid")
    }
}

impl std::fmt::Debug for TemplateRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateRenderer").finish_non_exhaustive()
    }
}

impl PageRenderer for TemplateRenderer {
    fn render(&self, _parts: &Parts, file: &RenderedFile) -> Response {
        let mut out = Vec::new();
        if let Err(err) = self.execute(file, &mut out) {
            tracing::error!(path = %file.path(), error = %err, "Error executing template");
        }

        ([(header::CONTENT_TYPE, "text/html; charset=utf-8")], out).into_response()
    }
}

fn format_modified(modified: SystemTime) -> String {
    DateTime::<Utc>::from(modified)
        .format("%Y-%m-%d %H:%M:%S UTC")
        .to_string()
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::{Duration, UNIX_EPOCH};

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use mdserve_renderer::RenderPipeline;
    use mdserve_storage::FileInfo;

    use super::*;
    use pretty_assertions::assert_eq;

    fn file(source: &str) -> RenderedFile {
        let info = FileInfo {
            name: "guide.md".to_owned(),
            size: source.len() as u64,
            mode: 0o644,
            modified: UNIX_EPOCH + Duration::from_secs(86_400),
            is_dir: false,
        };
        let pipeline = Arc::new(RenderPipeline::standard(None).unwrap());
        let mut reader = Cursor::new(source.as_bytes().to_vec());
        RenderedFile::load("guide.md", info, &mut reader, pipeline).unwrap()
    }

    fn parts() -> Parts {
        Request::get("/docs/guide.md")
            .body(Body::empty())
            .unwrap()
            .into_parts()
            .0
    }

    async fn body_string(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn test_format_modified() {
        assert_eq!(
            format_modified(UNIX_EPOCH + Duration::from_secs(86_400)),
            "1970-01-02 00:00:00 UTC"
        );
    }

    #[test]
    fn test_invalid_template() {
        assert!(matches!(
            TemplateRenderer::new("{% if %}"),
            Err(ServerError::Template(_))
        ));
    }

    #[tokio::test]
    async fn test_default_template() {
        let renderer = TemplateRenderer::default();
        let file = file("Title: Hello <World>\n\n# Heading\n\ntext\n");

        let response = renderer.render(&parts(), &file);

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
        let html = body_string(response).await;
        assert!(html.contains("<title>Hello &lt;World&gt;</title>"));
        assert!(html.contains(r#"<h1 id="heading">Heading</h1>"#));
        assert!(html.contains(r#"<ul class="nav flex-column">"#));
    }

    #[tokio::test]
    async fn test_custom_template_variables() {
        let renderer = TemplateRenderer::new(
            "{{ name }}|{{ path }}|{{ modified }}|{{ meta.Author }}|{{ title }}",
        )
        .unwrap();
        let file = file("Author: Ann\n\nbody\n");

        let html = body_string(renderer.render(&parts(), &file)).await;

        assert_eq!(html, "guide.md|guide.md|1970-01-02 00:00:00 UTC|Ann|Guide");
    }

    #[tokio::test]
    async fn test_template_failure_keeps_status_and_partial_output() {
        let renderer = TemplateRenderer::new("{{ body }}{{ title() }}").unwrap();
        let file = file("text\n");

        let response = renderer.render(&parts(), &file);

        assert_eq!(response.status(), StatusCode::OK);
        assert!(body_string(response).await.starts_with("<p>text</p>"));
    }

    #[tokio::test]
    async fn test_closure_renderer() {
        let renderer = |parts: &Parts, file: &RenderedFile| -> Response {
            format!("{} {}", parts.uri.path(), file.title()).into_response()
        };

        let response = PageRenderer::render(&renderer, &parts(), &file("x"));

        assert_eq!(body_string(response).await, "/docs/guide.md Guide");
    }
}
