//! Request path to Markdown file resolution.
//!
//! Resolution strips the configured prefix, opens the remaining path and
//! stats it. A directory is retried once as `<dir>/index.md`; a directory
//! without one is handed back to the caller for static serving.

use mdserve_storage::{File, FileInfo, FileSystem, StorageError, StorageErrorKind};
use percent_encoding::percent_decode_str;

use crate::error::ServerError;

/// Outcome of resolving a request path.
pub(crate) enum Resolved {
    /// An opened Markdown file.
    Markdown {
        /// Path relative to the filesystem root, after index substitution.
        path: String,
        /// Open handle, released when dropped.
        handle: Box<dyn File>,
        /// Metadata captured at open time.
        info: FileInfo,
    },
    /// A directory without an index document.
    Fallback,
}

impl std::fmt::Debug for Resolved {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Markdown { path, info, .. } => f
                .debug_struct("Markdown")
                .field("path", path)
                .field("info", info)
                .finish_non_exhaustive(),
            Self::Fallback => f.write_str("Fallback"),
        }
    }
}

/// True if `path` names a Markdown file (`.md`, any case).
pub(crate) fn is_markdown_path(path: &str) -> bool {
    path.len() >= 3
        && path
            .get(path.len() - 3..)
            .is_some_and(|ext| ext.eq_ignore_ascii_case(".md"))
}

/// Strip `prefix` from a raw URI path and percent-decode the rest.
///
/// Returns `None` if the path is outside the prefix or not valid UTF-8
/// once decoded.
pub(crate) fn strip_prefix(uri_path: &str, prefix: &str) -> Option<String> {
    let rest = uri_path.strip_prefix(prefix)?;
    percent_decode_str(rest)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

/// Resolve a request path against `fs`.
///
/// # Errors
///
/// - [`ServerError::NotFound`] if the path is outside the prefix or missing
/// - [`ServerError::Forbidden`] if it resolves to a non-Markdown file
/// - [`ServerError::Open`] / [`ServerError::Stat`] for other storage faults
pub(crate) fn resolve(
    fs: &dyn FileSystem,
    uri_path: &str,
    prefix: &str,
) -> Result<Resolved, ServerError> {
    let Some(mut path) = strip_prefix(uri_path, prefix) else {
        tracing::debug!(uri_path, prefix, "Request outside prefix");
        return Err(ServerError::NotFound);
    };

    let mut handle = fs.open(&path).map_err(|err| open_error(&path, err))?;
    let mut substituted = false;

    loop {
        let info = handle.stat().map_err(|source| ServerError::Stat {
            path: path.clone(),
            source,
        })?;

        if !info.is_dir {
            if !is_markdown_path(&path) {
                tracing::debug!(path = %path, "Refusing non-Markdown file");
                return Err(ServerError::Forbidden);
            }
            return Ok(Resolved::Markdown { path, handle, info });
        }

        if substituted {
            tracing::debug!(path = %path, "Index is a directory, falling back");
            return Ok(Resolved::Fallback);
        }

        let index = format!("{}/index.md", path.trim_end_matches('/'));
        match fs.open(&index) {
            Ok(index_handle) => {
                tracing::debug!(dir = %path, index = %index, "Serving directory index");
                handle = index_handle;
                path = index;
                substituted = true;
            }
            Err(err) => {
                tracing::debug!(dir = %path, error = %err, "No directory index, falling back");
                return Ok(Resolved::Fallback);
            }
        }
    }
}

fn open_error(path: &str, err: StorageError) -> ServerError {
    match err.kind {
        StorageErrorKind::NotFound | StorageErrorKind::InvalidPath => {
            tracing::debug!(path, error = %err, "Not found");
            ServerError::NotFound
        }
        _ => ServerError::Open {
            path: path.to_owned(),
            source: err,
        },
    }
}
