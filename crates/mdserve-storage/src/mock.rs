//! Mock filesystem implementation for testing.
//!
//! Provides [`MockFs`] for unit testing without filesystem access.

use std::collections::BTreeMap;
use std::io::{self, Cursor, Read, Seek, SeekFrom};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::path::clean_path;
use crate::storage::{File, FileInfo, FileSystem, StorageError, StorageErrorKind};

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

#[derive(Clone, Debug)]
enum Entry {
    File(Vec<u8>),
    Dir,
}

/// Fault to inject for a path.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Fault {
    Open(StorageErrorKind),
    Stat,
    Read,
}

/// Mock filesystem for testing.
///
/// Stores files in memory. Parent directories are created implicitly.
/// Use the builder methods to configure the mock with test data and faults.
///
/// # Example
///
/// ```
/// use std::io::Read;
/// use mdserve_storage::{FileSystem, MockFs};
///
/// let fs = MockFs::new()
///     .with_file("guide.md", "# User Guide\n\nContent.")
///     .with_dir("empty");
///
/// let mut content = String::new();
/// fs.open("/guide.md").unwrap().read_to_string(&mut content).unwrap();
/// assert!(fs.open("/empty").unwrap().stat().unwrap().is_dir);
/// ```
#[derive(Debug)]
pub struct MockFs {
    entries: RwLock<BTreeMap<String, Entry>>,
    mtimes: RwLock<BTreeMap<String, SystemTime>>,
    faults: RwLock<BTreeMap<String, Fault>>,
    open_handles: Arc<AtomicUsize>,
}

impl Default for MockFs {
    fn default() -> Self {
        let mut entries = BTreeMap::new();
        entries.insert(String::new(), Entry::Dir);
        Self {
            entries: RwLock::new(entries),
            mtimes: RwLock::new(BTreeMap::new()),
            faults: RwLock::new(BTreeMap::new()),
            open_handles: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl MockFs {
    /// Create a new mock filesystem containing only the root directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file with the given content.
    ///
    /// # Panics
    ///
    /// Panics if the path is invalid or the internal lock is poisoned.
    #[must_use]
    pub fn with_file(self, path: &str, content: impl Into<Vec<u8>>) -> Self {
        let key = clean_path(path).unwrap();
        self.add_parents(&key);
        self.entries
            .write()
            .unwrap()
            .insert(key, Entry::File(content.into()));
        self
    }

    /// Add an (empty) directory.
    ///
    /// # Panics
    ///
    /// Panics if the path is invalid or the internal lock is poisoned.
    #[must_use]
    pub fn with_dir(self, path: &str) -> Self {
        let key = clean_path(path).unwrap();
        self.add_parents(&key);
        self.entries.write().unwrap().insert(key, Entry::Dir);
        self
    }

    /// Set modification time for a path.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the entry
    /// * `mtime` - Modification time as seconds since Unix epoch
    ///
    /// # Panics
    ///
    /// Panics if the path is invalid or the internal lock is poisoned.
    #[must_use]
    pub fn with_mtime(self, path: &str, mtime: u64) -> Self {
        let key = clean_path(path).unwrap();
        self.mtimes
            .write()
            .unwrap()
            .insert(key, UNIX_EPOCH + Duration::from_secs(mtime));
        self
    }

    /// Make `open()` fail for a path with the given error kind.
    ///
    /// # Panics
    ///
    /// Panics if the path is invalid or the internal lock is poisoned.
    #[must_use]
    pub fn with_open_error(self, path: &str, kind: StorageErrorKind) -> Self {
        self.with_fault(path, Fault::Open(kind))
    }

    /// Make `stat()` fail on handles opened for a path.
    ///
    /// # Panics
    ///
    /// Panics if the path is invalid or the internal lock is poisoned.
    #[must_use]
    pub fn with_stat_error(self, path: &str) -> Self {
        self.with_fault(path, Fault::Stat)
    }

    /// Make reads fail on handles opened for a path.
    ///
    /// # Panics
    ///
    /// Panics if the path is invalid or the internal lock is poisoned.
    #[must_use]
    pub fn with_read_error(self, path: &str) -> Self {
        self.with_fault(path, Fault::Read)
    }

    /// Number of handles opened and not yet dropped.
    #[must_use]
    pub fn open_handles(&self) -> usize {
        self.open_handles.load(Ordering::SeqCst)
    }

    fn with_fault(self, path: &str, fault: Fault) -> Self {
        let key = clean_path(path).unwrap();
        self.faults.write().unwrap().insert(key, fault);
        self
    }

    fn add_parents(&self, key: &str) {
        let mut entries = self.entries.write().unwrap();
        let mut parent = key;
        while let Some((dir, _)) = parent.rsplit_once('/') {
            entries.entry(dir.to_owned()).or_insert(Entry::Dir);
            parent = dir;
        }
    }

    fn info_for(&self, key: &str, entry: &Entry) -> FileInfo {
        let modified = self
            .mtimes
            .read()
            .unwrap()
            .get(key)
            .copied()
            .unwrap_or(UNIX_EPOCH);
        let name = key.rsplit('/').next().unwrap_or_default().to_owned();
        match entry {
            Entry::File(data) => FileInfo {
                name,
                size: data.len() as u64,
                mode: 0o644,
                modified,
                is_dir: false,
            },
            Entry::Dir => FileInfo {
                name,
                size: 0,
                mode: 0o755,
                modified,
                is_dir: true,
            },
        }
    }

    fn children(&self, key: &str) -> Vec<FileInfo> {
        let entries = self.entries.read().unwrap();
        entries
            .iter()
            .filter(|(path, _)| {
                !path.is_empty() && path.rsplit_once('/').map_or("", |(dir, _)| dir) == key
            })
            .map(|(path, entry)| self.info_for(path, entry))
            .collect()
    }
}

impl FileSystem for MockFs {
    fn open(&self, path: &str) -> Result<Box<dyn File>, StorageError> {
        let key = clean_path(path).map_err(|e| e.with_backend(BACKEND))?;
        let fault = self.faults.read().unwrap().get(&key).copied();

        if let Some(Fault::Open(kind)) = fault {
            return Err(StorageError::new(kind)
                .with_backend(BACKEND)
                .with_path(&key));
        }

        let entry = self
            .entries
            .read()
            .unwrap()
            .get(&key)
            .cloned()
            .ok_or_else(|| StorageError::not_found(&key).with_backend(BACKEND))?;

        let info = self.info_for(&key, &entry);
        let (data, children) = match entry {
            Entry::File(data) => (data, None),
            Entry::Dir => (Vec::new(), Some(self.children(&key))),
        };

        self.open_handles.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockFile {
            cursor: Cursor::new(data),
            info,
            children,
            fail_stat: fault == Some(Fault::Stat),
            fail_read: fault == Some(Fault::Read),
            open_handles: Arc::clone(&self.open_handles),
        }))
    }
}

/// Handle returned by [`MockFs::open`].
struct MockFile {
    cursor: Cursor<Vec<u8>>,
    info: FileInfo,
    children: Option<Vec<FileInfo>>,
    fail_stat: bool,
    fail_read: bool,
    open_handles: Arc<AtomicUsize>,
}

impl Drop for MockFile {
    fn drop(&mut self) {
        self.open_handles.fetch_sub(1, Ordering::SeqCst);
    }
}

impl Read for MockFile {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.fail_read {
            return Err(io::Error::other("injected read failure"));
        }
        if self.info.is_dir {
            return Err(io::Error::new(io::ErrorKind::IsADirectory, "is a directory"));
        }
        self.cursor.read(buf)
    }
}

impl Seek for MockFile {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        self.cursor.seek(pos)
    }
}

impl File for MockFile {
    fn stat(&self) -> Result<FileInfo, StorageError> {
        if self.fail_stat {
            return Err(StorageError::new(StorageErrorKind::Other)
                .with_backend(BACKEND)
                .with_source(io::Error::other("injected stat failure")));
        }
        Ok(self.info.clone())
    }

    fn read_dir(&mut self) -> Result<Vec<FileInfo>, StorageError> {
        self.children
            .clone()
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotADirectory).with_backend(BACKEND))
    }
}
