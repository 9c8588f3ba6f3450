//! Router construction.
//!
//! Builds the axum router for either serving mode.

use axum::Router;
use axum::extract::{Request, State};
use axum::response::Response;
use mdserve_config::ServeMode;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::markdown::Markdown;
use crate::middleware::security;
use crate::static_files::StaticFiles;

/// Create the application router.
///
/// - [`ServeMode::Standalone`]: every request goes to the Markdown handler,
///   so only Markdown files (and directory listings) are served.
/// - [`ServeMode::Middleware`]: static files are served for the whole tree
///   and the Markdown layer intercepts `.md` requests in front of them.
pub fn create_router(markdown: Markdown, files: StaticFiles, mode: ServeMode) -> Router {
    let router = match mode {
        ServeMode::Standalone => Router::new().fallback(serve_markdown).with_state(markdown),
        ServeMode::Middleware => Router::new()
            .fallback(serve_static)
            .with_state(files)
            .layer(markdown.layer()),
    };

    router.layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(security::content_type_options_layer())
            .layer(security::frame_options_layer()),
    )
}

async fn serve_markdown(State(markdown): State<Markdown>, req: Request) -> Response {
    markdown.serve(req)
}

async fn serve_static(State(files): State<StaticFiles>, req: Request) -> Response {
    files.serve(&req)
}
