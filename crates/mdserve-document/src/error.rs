//! Document error types.

/// Error loading a document.
#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    /// Reading the document stream failed.
    #[error("Failed to read {path}: {source}")]
    Read {
        /// Path of the document being read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
