//! Virtual filesystem abstraction for mdserve.
//!
//! This crate provides a [`FileSystem`] trait for opening files and directories
//! from whatever backs a served document tree. This enables:
//!
//! - **Unit testing** of request handling without touching the real filesystem
//! - **Backend flexibility** (local directory, in-memory tree, archives)
//! - **Clean separation** between request resolution and I/O
//!
//! # Architecture
//!
//! The crate provides:
//! - [`FileSystem`] trait with a single `open()` method
//! - [`File`] trait for opened handles (`Read + Seek` plus `stat()` and `read_dir()`)
//! - [`DirFs`] implementation rooted at a local directory
//! - [`MockFs`] in-memory implementation for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```no_run
//! use std::io::Read;
//! use mdserve_storage::{DirFs, FileSystem};
//!
//! let fs = DirFs::new("docs");
//! let mut file = fs.open("/guide.md")?;
//! let info = file.stat()?;
//! let mut content = String::new();
//! file.read_to_string(&mut content)?;
//! println!("{} ({} bytes)", info.name, info.size);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod fs;
#[cfg(feature = "mock")]
mod mock;
mod path;
mod storage;

pub use fs::DirFs;
#[cfg(feature = "mock")]
pub use mock::MockFs;
pub use path::clean_path;
pub use storage::{File, FileInfo, FileSystem, StorageError, StorageErrorKind};
