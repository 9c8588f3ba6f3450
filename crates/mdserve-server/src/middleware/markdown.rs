//! Markdown rendering as a tower middleware.
//!
//! `MarkdownLayer` and `MarkdownService` wrap any inner service. Requests
//! for paths ending in `.md` are answered by [`Markdown`] and never reach
//! the inner service; everything else passes through untouched.

use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};

use crate::markdown::Markdown;
use crate::resolver::is_markdown_path;

/// Tower `Layer` that routes Markdown requests to a [`Markdown`] handler.
#[derive(Clone, Debug)]
pub struct MarkdownLayer {
    markdown: Markdown,
}

impl MarkdownLayer {
    /// Create a layer dispatching to `markdown`.
    pub fn new(markdown: Markdown) -> Self {
        Self { markdown }
    }
}

impl<S> Layer<S> for MarkdownLayer {
    type Service = MarkdownService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MarkdownService {
            inner,
            markdown: self.markdown.clone(),
        }
    }
}

/// Tower `Service` that renders `.md` requests and forwards the rest.
#[derive(Clone, Debug)]
pub struct MarkdownService<S> {
    inner: S,
    markdown: Markdown,
}

impl<S> Service<Request<Body>> for MarkdownService<S>
where
    S: Service<Request<Body>, Error = Infallible> + Clone + Send + 'static,
    S::Response: IntoResponse,
    S::Future: Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        if is_markdown_path(req.uri().path()) {
            tracing::trace!(path = %req.uri().path(), "Dispatching to markdown handler");
            let response = self.markdown.serve(req);
            return Box::pin(async move { Ok(response) });
        }

        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let resp = inner
                .call(req)
                .await
                .unwrap_or_else(|infallible| match infallible {});
            Ok(resp.into_response())
        })
    }
}
