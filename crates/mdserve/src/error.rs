//! CLI error types.

use mdserve_config::ConfigError;
use mdserve_document::DocumentError;
use mdserve_renderer::RenderError;
use mdserve_storage::StorageError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Storage(#[from] StorageError),

    #[error("{0}")]
    Document(#[from] DocumentError),

    #[error("{0}")]
    Render(#[from] RenderError),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Validation(String),
}
