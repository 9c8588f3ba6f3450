//! Error types for the HTTP server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use mdserve_storage::StorageError;

/// Error handling a Markdown request.
///
/// The display text of each variant is the plain-text response body.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Path is outside the prefix or does not exist.
    #[error("404 page not found")]
    NotFound,

    /// Path resolves to a file that is not Markdown.
    #[error("forbidden")]
    Forbidden,

    /// Opening the path failed for a reason other than absence.
    #[error("error opening {path:?}: {source}")]
    Open {
        /// Path being opened.
        path: String,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// Stat of an opened entry failed.
    #[error("error stating {path:?}: {source}")]
    Stat {
        /// Path being stat'ed.
        path: String,
        /// Underlying storage error.
        #[source]
        source: StorageError,
    },

    /// Reading the document failed.
    #[error("error reading {path:?}: {source}")]
    Read {
        /// Path being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Page template failed to compile.
    #[error("Invalid page template: {0}")]
    Template(#[from] minijinja::Error),
}

impl ServerError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Open { .. } | Self::Stat { .. } | Self::Read { .. } | Self::Template(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<mdserve_document::DocumentError> for ServerError {
    fn from(err: mdserve_document::DocumentError) -> Self {
        match err {
            mdserve_document::DocumentError::Read { path, source } => Self::Read { path, source },
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}
