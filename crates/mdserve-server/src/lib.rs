//! HTTP handler and server that renders Markdown files on request.
//!
//! Markdown files are read from a [`FileSystem`](mdserve_storage::FileSystem),
//! split into front matter and content, rendered to sanitized HTML and
//! wrapped in a page by a [`PageRenderer`]. Everything else falls back to
//! plain static file serving.
//!
//! # Serving Modes
//!
//! - **Standalone**: [`Markdown`] handles every request. Non-Markdown files
//!   are forbidden; directories render their `index.md` or are listed.
//! - **Middleware**: [`MarkdownLayer`] wraps another service and only
//!   intercepts requests whose path ends in `.md`.
//!
//! # Quick Start
//!
//! ```ignore
//! use std::path::PathBuf;
//! use mdserve_server::{ServeMode, ServerConfig, run_server};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = ServerConfig {
//!         root: PathBuf::from("docs"),
//!         prefix: "/docs/".to_owned(),
//!         mode: ServeMode::Middleware,
//!         ..ServerConfig::default()
//!     };
//!
//!     run_server(config).await.unwrap();
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! Request ──► Markdown ──► resolver (open, stat, dir → index.md)
//!                │              │
//!                │              ├─► 404 / 403 / 500
//!                │              └─► directory without index ──► StaticFiles
//!                │
//!                └─► RenderedFile (front matter, render-once HTML)
//!                        │
//!                        └─► PageRenderer ──► response
//! ```

mod app;
mod error;
mod markdown;
mod middleware;
mod render;
mod resolver;
mod static_files;
mod template;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use mdserve_renderer::{DEFAULT_THEME, RenderPipeline};
use mdserve_storage::{DirFs, FileSystem};

pub use app::create_router;
pub use error::ServerError;
pub use markdown::Markdown;
pub use mdserve_config::ServeMode;
pub use middleware::{MarkdownLayer, MarkdownService};
pub use render::{PageRenderer, TemplateRenderer};
pub use static_files::StaticFiles;
pub use template::DEFAULT_TEMPLATE;

/// Server configuration.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Directory served as the filesystem root.
    pub root: PathBuf,
    /// URL prefix stripped from request paths.
    pub prefix: String,
    /// Serving mode.
    pub mode: ServeMode,
    /// Generate a table of contents for each page.
    pub toc: bool,
    /// Syntax highlighting theme.
    pub highlight_theme: String,
    /// Page template file (`None` uses [`DEFAULT_TEMPLATE`]).
    pub template: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
            root: PathBuf::from("docs"),
            prefix: "/".to_owned(),
            mode: ServeMode::default(),
            toc: true,
            highlight_theme: DEFAULT_THEME.to_owned(),
            template: None,
        }
    }
}

/// Build the Markdown handler described by `config` over `fs`.
///
/// # Errors
///
/// Returns an error if the highlight theme is unknown or the template file
/// cannot be read or compiled.
pub fn build_markdown(
    config: &ServerConfig,
    fs: Arc<dyn FileSystem>,
) -> Result<Markdown, Box<dyn std::error::Error>> {
    let pipeline = RenderPipeline::standard(Some(&config.highlight_theme))?.with_toc(config.toc);
    let markdown = Markdown::new(config.prefix.clone(), fs, Arc::new(pipeline));

    Ok(match &config.template {
        Some(path) => {
            let source = std::fs::read_to_string(path)?;
            tracing::info!(template = %path.display(), "Using custom page template");
            markdown.with_renderer(TemplateRenderer::new(source)?)
        }
        None => markdown,
    })
}

/// Run the server.
///
/// # Arguments
///
/// * `config` - Server configuration
///
/// # Errors
///
/// Returns an error if the server fails to start.
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let fs: Arc<dyn FileSystem> = Arc::new(DirFs::new(config.root.clone()));
    let markdown = build_markdown(&config, Arc::clone(&fs))?;
    let files = StaticFiles::new(fs, config.prefix.clone());

    let app = create_router(markdown, files, config.mode);

    let addr = SocketAddr::from_str(&format!("{}:{}", config.host, config.port))?;
    tracing::info!(
        address = %addr,
        root = %config.root.display(),
        prefix = %config.prefix,
        mode = ?config.mode,
        "Starting server"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Wait for shutdown signal (Ctrl-C).
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    tracing::info!("Shutdown signal received, stopping server...");
}

/// Create server configuration from mdserve config.
#[must_use]
pub fn server_config_from_config(config: &mdserve_config::Config) -> ServerConfig {
    ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
        root: config.docs_resolved.root.clone(),
        prefix: config.docs_resolved.prefix.clone(),
        mode: config.docs_resolved.mode,
        toc: config.render_resolved.toc,
        highlight_theme: config.render_resolved.highlight_theme.clone(),
        template: config.render_resolved.template.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_server_config_from_default_config() {
        let config = mdserve_config::Config::default();

        let server = server_config_from_config(&config);

        assert_eq!(server.host, "127.0.0.1");
        assert_eq!(server.port, 8080);
        assert_eq!(server.root, Path::new(".").join("docs"));
        assert_eq!(server.prefix, "/");
        assert_eq!(server.mode, ServeMode::Standalone);
        assert!(server.toc);
        assert_eq!(server.highlight_theme, DEFAULT_THEME);
    }

    #[test]
    fn test_build_markdown_unknown_theme() {
        let config = ServerConfig {
            highlight_theme: "nope".to_owned(),
            ..ServerConfig::default()
        };

        let result = build_markdown(&config, Arc::new(DirFs::new(".")));

        assert!(result.is_err());
    }

    #[test]
    fn test_build_markdown_missing_template() {
        let config = ServerConfig {
            template: Some(PathBuf::from("/nonexistent/page.html")),
            ..ServerConfig::default()
        };

        let result = build_markdown(&config, Arc::new(DirFs::new(".")));

        assert!(result.is_err());
    }
}
