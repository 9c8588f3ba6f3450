//! Filesystem traits and error types.
//!
//! Provides the core [`FileSystem`] and [`File`] traits for abstracting file access,
//! along with [`StorageError`] for unified error handling across backends.
//!
//! # Path Convention
//!
//! Paths passed to [`FileSystem::open`] are slash-separated URL-style paths
//! relative to the backend root:
//! - `""` or `"/"` - the root directory
//! - `"guide.md"` - a file in the root
//! - `"/domain/billing.md"` - a nested file (leading slash is optional)

use std::io::{Read, Seek};
use std::path::PathBuf;
use std::time::SystemTime;

/// Snapshot of an entry's metadata, captured when the entry is stat'ed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileInfo {
    /// Base name of the entry (empty for the backend root).
    pub name: String,
    /// Size in bytes (zero for directories).
    pub size: u64,
    /// Unix permission bits (zero where the backend has none).
    pub mode: u32,
    /// Last modification time.
    pub modified: SystemTime,
    /// True if the entry is a directory.
    pub is_dir: bool,
}

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[non_exhaustive]
pub enum StorageErrorKind {
    /// Entry does not exist.
    NotFound,
    /// Permission denied.
    PermissionDenied,
    /// Invalid path (e.g., escapes the root).
    InvalidPath,
    /// Operation needs a directory but the entry is a file.
    NotADirectory,
    /// Other/unknown error category.
    Other,
}

/// Storage error with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StorageError {
    /// Semantic error category.
    pub kind: StorageErrorKind,
    /// Path context (if applicable).
    pub path: Option<PathBuf>,
    /// Backend identifier (e.g., "Dir", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StorageError {
    /// Create a new storage error.
    #[must_use]
    pub fn new(kind: StorageErrorKind) -> Self {
        Self {
            kind,
            path: None,
            backend: None,
            source: None,
        }
    }

    /// Attach path context.
    #[must_use]
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error with path.
    #[must_use]
    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::new(StorageErrorKind::NotFound).with_path(path)
    }

    /// Whether this error means the entry does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.kind == StorageErrorKind::NotFound
    }

    /// Create a storage error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error, path: Option<PathBuf>) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => StorageErrorKind::NotFound,
            std::io::ErrorKind::PermissionDenied => StorageErrorKind::PermissionDenied,
            std::io::ErrorKind::NotADirectory => StorageErrorKind::NotADirectory,
            _ => StorageErrorKind::Other,
        };
        let mut error = Self::new(kind).with_source(err);
        if let Some(p) = path {
            error = error.with_path(p);
        }
        error
    }
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (path: /foo/bar)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StorageErrorKind::NotFound => "Not found",
            StorageErrorKind::PermissionDenied => "Permission denied",
            StorageErrorKind::InvalidPath => "Invalid path",
            StorageErrorKind::NotADirectory => "Not a directory",
            StorageErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(path) = &self.path {
            write!(f, " (path: {})", path.display())?;
        }

        Ok(())
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// An opened file or directory.
///
/// Dropping the handle releases it; there is no explicit close.
pub trait File: Read + Seek + Send {
    /// Stat the opened entry.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the metadata cannot be retrieved.
    fn stat(&self) -> Result<FileInfo, StorageError>;

    /// List the entries of an opened directory, sorted by name.
    ///
    /// # Errors
    ///
    /// Returns [`StorageErrorKind::NotADirectory`] when called on a file,
    /// or another [`StorageError`] if listing fails.
    fn read_dir(&mut self) -> Result<Vec<FileInfo>, StorageError>;
}

/// Read-only filesystem abstraction.
///
/// Implementations must report a missing entry with
/// [`StorageErrorKind::NotFound`] so callers can tell it apart from other faults.
pub trait FileSystem: Send + Sync {
    /// Open the entry at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the entry doesn't exist or can't be opened.
    fn open(&self, path: &str) -> Result<Box<dyn File>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display_full() {
        let err = StorageError::new(StorageErrorKind::NotFound)
            .with_backend("Dir")
            .with_path("guide.md");

        assert_eq!(err.to_string(), "[Dir] Not found (path: guide.md)");
    }

    #[test]
    fn test_storage_error_display_with_source() {
        let io = std::io::Error::other("disk on fire");
        let err = StorageError::io(io, Some(PathBuf::from("a.md")));

        assert_eq!(err.kind, StorageErrorKind::Other);
        assert_eq!(err.to_string(), "Error: disk on fire (path: a.md)");
    }

    #[test]
    fn test_storage_error_from_io_not_found() {
        let io = std::io::Error::from(std::io::ErrorKind::NotFound);
        let err = StorageError::io(io, None);

        assert!(err.is_not_found());
        assert!(err.path.is_none());
    }

    #[test]
    fn test_storage_error_from_io_permission_denied() {
        let io = std::io::Error::from(std::io::ErrorKind::PermissionDenied);
        let err = StorageError::io(io, None);

        assert_eq!(err.kind, StorageErrorKind::PermissionDenied);
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_storage_error_downcast_source() {
        let io = std::io::Error::other("boom");
        let err = StorageError::io(io, None);

        let source = err.downcast_source::<std::io::Error>().unwrap();
        assert_eq!(source.to_string(), "boom");
    }

    #[test]
    fn test_storage_error_source_chain() {
        use std::error::Error;

        let err = StorageError::not_found("x.md");
        assert!(err.source().is_none());
    }
}
