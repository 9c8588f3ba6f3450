//! Local directory backend.
//!
//! Provides [`DirFs`] for serving files from a directory on disk.

use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::path::clean_path;
use crate::storage::{File, FileInfo, FileSystem, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Dir";

/// Filesystem rooted at a local directory.
///
/// Paths are resolved beneath `root`; anything that would escape it is
/// rejected with [`StorageErrorKind::InvalidPath`].
///
/// # Example
///
/// ```no_run
/// use mdserve_storage::{DirFs, FileSystem};
///
/// let fs = DirFs::new("docs");
/// let dir = fs.open("/")?;
/// assert!(dir.stat()?.is_dir);
/// # Ok::<(), mdserve_storage::StorageError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DirFs {
    root: PathBuf,
}

impl DirFs {
    /// Create a filesystem rooted at `root`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory on disk.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<(PathBuf, String), StorageError> {
        let cleaned = clean_path(path).map_err(|e| e.with_backend(BACKEND))?;
        let full = if cleaned.is_empty() {
            self.root.clone()
        } else {
            self.root.join(&cleaned)
        };
        Ok((full, cleaned))
    }
}

impl FileSystem for DirFs {
    fn open(&self, path: &str) -> Result<Box<dyn File>, StorageError> {
        let (full, cleaned) = self.resolve(path)?;
        let io_err = |e: io::Error| {
            StorageError::io(e, Some(PathBuf::from(&cleaned))).with_backend(BACKEND)
        };

        let meta = fs::metadata(&full).map_err(io_err)?;
        let name = entry_name(&cleaned);

        if meta.is_dir() {
            tracing::trace!(path = %cleaned, "Opened directory");
            return Ok(Box::new(OsDir { full, name }));
        }

        let file = fs::File::open(&full).map_err(io_err)?;
        tracing::trace!(path = %cleaned, "Opened file");
        Ok(Box::new(OsFile { file, name }))
    }
}

/// Last path segment, or empty for the root.
fn entry_name(cleaned: &str) -> String {
    cleaned.rsplit('/').next().unwrap_or_default().to_owned()
}

fn info_from_metadata(name: String, meta: &fs::Metadata) -> FileInfo {
    FileInfo {
        name,
        size: if meta.is_dir() { 0 } else { meta.len() },
        mode: permission_bits(meta),
        modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
        is_dir: meta.is_dir(),
    }
}

#[cfg(unix)]
fn permission_bits(meta: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o7777
}

#[cfg(not(unix))]
fn permission_bits(meta: &fs::Metadata) -> u32 {
    if meta.permissions().readonly() { 0o444 } else { 0o644 }
}

/// Opened regular file.
struct OsFile {
    file: fs::File,
    name: String,
}

impl Read for OsFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}

impl Seek for OsFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.file.seek(pos)
    }
}

impl File for OsFile {
    fn stat(&self) -> Result<FileInfo, StorageError> {
        let meta = self
            .file
            .metadata()
            .map_err(|e| StorageError::io(e, None).with_backend(BACKEND))?;
        Ok(info_from_metadata(self.name.clone(), &meta))
    }

    fn read_dir(&mut self) -> Result<Vec<FileInfo>, StorageError> {
        Err(StorageError::new(StorageErrorKind::NotADirectory).with_backend(BACKEND))
    }
}

/// Opened directory. Holds no descriptor; entries are listed on demand.
struct OsDir {
    full: PathBuf,
    name: String,
}

impl Read for OsDir {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::IsADirectory, "is a directory"))
    }
}

impl Seek for OsDir {
    fn seek(&mut self, _pos: SeekFrom) -> io::Result<u64> {
        Ok(0)
    }
}

impl File for OsDir {
    fn stat(&self) -> Result<FileInfo, StorageError> {
        let meta = fs::metadata(&self.full)
            .map_err(|e| StorageError::io(e, Some(self.full.clone())).with_backend(BACKEND))?;
        Ok(info_from_metadata(self.name.clone(), &meta))
    }

    fn read_dir(&mut self) -> Result<Vec<FileInfo>, StorageError> {
        let io_err =
            |e: io::Error| StorageError::io(e, Some(self.full.clone())).with_backend(BACKEND);

        let mut entries = Vec::new();
        for entry in fs::read_dir(&self.full).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let meta = entry.metadata().map_err(io_err)?;
            let name = entry.file_name().to_string_lossy().into_owned();
            entries.push(info_from_metadata(name, &meta));
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}
