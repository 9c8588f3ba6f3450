//! End-to-end request handling through the router in both serving modes.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use mdserve_renderer::RenderPipeline;
use mdserve_server::{Markdown, ServeMode, StaticFiles, create_router};
use mdserve_storage::{FileSystem, MockFs};
use pretty_assertions::assert_eq;
use tower::ServiceExt;

fn docs() -> Arc<dyn FileSystem> {
    Arc::new(
        MockFs::new()
            .with_file("guide.md", "Title: User Guide\n\n# Install\n\n## Linux\n\ntext\n")
            .with_file("plain.md", "# Heading\n\n<script>alert(1)</script>\n")
            .with_file("api/index.md", "# API\n")
            .with_file("assets/style.css", "body {}")
            .with_file("logo.png", [0x89, b'P', b'N', b'G']),
    )
}

fn router(mode: ServeMode) -> Router {
    let fs = docs();
    let pipeline = Arc::new(RenderPipeline::standard(None).unwrap());
    let markdown = Markdown::new("/docs/", Arc::clone(&fs), pipeline);
    create_router(markdown, StaticFiles::new(fs, "/docs/"), mode)
}

async fn get(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::get(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).into_owned())
}

#[tokio::test]
async fn renders_markdown_with_front_matter_title() {
    let (status, html) = get(router(ServeMode::Standalone), "/docs/guide.md").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<title>User Guide</title>"));
    assert!(html.contains(r#"<h2 id="linux">Linux</h2>"#));
    assert!(html.contains(r##"<a class="nav-link" href="#linux">Linux</a>"##));
    assert!(!html.contains("Title: User Guide"));
}

#[tokio::test]
async fn sets_html_content_type_and_security_headers() {
    let response = router(ServeMode::Standalone)
        .oneshot(Request::get("/docs/guide.md").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/html; charset=utf-8"
    );
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn strips_scripts_from_body() {
    let (_, html) = get(router(ServeMode::Standalone), "/docs/plain.md").await;

    assert!(html.contains(r#"<h1 id="heading">Heading</h1>"#));
    assert!(!html.contains("alert(1)"));
}

#[tokio::test]
async fn directory_index_matches_direct_request() {
    let (status, via_dir) = get(router(ServeMode::Standalone), "/docs/api/").await;
    let (_, direct) = get(router(ServeMode::Standalone), "/docs/api/index.md").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(via_dir, direct);
}

#[tokio::test]
async fn directory_without_index_is_listed() {
    let (status, html) = get(router(ServeMode::Standalone), "/docs/assets/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"<a href="style.css">style.css</a>"#));
}

#[tokio::test]
async fn missing_markdown_is_404() {
    let (status, body) = get(router(ServeMode::Standalone), "/docs/missing.md").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, "404 page not found");
}

#[tokio::test]
async fn standalone_forbids_non_markdown() {
    let (status, body) = get(router(ServeMode::Standalone), "/docs/logo.png").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body, "forbidden");
}

#[tokio::test]
async fn standalone_outside_prefix_is_404() {
    let (status, _) = get(router(ServeMode::Standalone), "/guide.md").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn middleware_serves_static_files() {
    let (status, body) = get(router(ServeMode::Middleware), "/docs/assets/style.css").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "body {}");
}

#[tokio::test]
async fn middleware_renders_markdown() {
    let (status, html) = get(router(ServeMode::Middleware), "/docs/guide.md").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains("<title>User Guide</title>"));
}

#[tokio::test]
async fn middleware_directory_goes_to_static_files() {
    // Directory paths don't end in .md, so the static handler answers.
    let (status, html) = get(router(ServeMode::Middleware), "/docs/api/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(html.contains(r#"<a href="index.md">index.md</a>"#));
}

#[tokio::test]
async fn custom_renderer_replaces_template() {
    let fs = docs();
    let pipeline = Arc::new(RenderPipeline::standard(None).unwrap().with_toc(false));
    let markdown = Markdown::new("/docs/", Arc::clone(&fs), pipeline).with_renderer(
        |_: &axum::http::request::Parts, file: &mdserve_document::RenderedFile| -> Response {
            (StatusCode::ACCEPTED, file.body().to_owned()).into_response()
        },
    );
    let app = create_router(markdown, StaticFiles::new(fs, "/docs/"), ServeMode::Standalone);

    let (status, body) = get(app, "/docs/api/index.md").await;

    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body, "<h1 id=\"api\">API</h1>\n");
}
