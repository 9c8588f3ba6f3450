//! Renderer error types.

/// Error building a render pipeline.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// Highlighting theme is not bundled.
    #[error("Unknown highlight theme: {0}")]
    UnknownTheme(String),
}
