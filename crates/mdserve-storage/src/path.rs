//! Path normalization shared by backends.

use crate::storage::{StorageError, StorageErrorKind};

/// Normalize a slash-separated path relative to a backend root.
///
/// Empty and `.` segments are dropped, so `"/a//./b/"` becomes `"a/b"` and
/// the root is `""`. Paths that would escape the root (`..`) or contain
/// backslashes or NUL bytes are rejected.
///
/// # Errors
///
/// Returns [`StorageErrorKind::InvalidPath`] for rejected paths.
///
/// # Examples
///
/// ```
/// use mdserve_storage::clean_path;
///
/// assert_eq!(clean_path("/docs//guide.md").unwrap(), "docs/guide.md");
/// assert_eq!(clean_path("/").unwrap(), "");
/// assert!(clean_path("../etc/passwd").is_err());
/// ```
pub fn clean_path(path: &str) -> Result<String, StorageError> {
    let mut segments = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                return Err(StorageError::new(StorageErrorKind::InvalidPath).with_path(path));
            }
            s if s.contains(['\\', '\0']) => {
                return Err(StorageError::new(StorageErrorKind::InvalidPath).with_path(path));
            }
            s => segments.push(s),
        }
    }
    Ok(segments.join("/"))
}
