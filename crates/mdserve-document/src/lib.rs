//! Markdown documents as served by mdserve.
//!
//! A [`RenderedFile`] is built once per request from an opened file: its
//! front matter is split off into [`Attributes`], the title is derived from
//! the file name (or the `Title` attribute), and the HTML is rendered lazily
//! on first access and cached for the lifetime of the value.
//!
//! # Example
//!
//! ```
//! use std::io::Cursor;
//! use std::sync::Arc;
//! use std::time::SystemTime;
//!
//! use mdserve_document::RenderedFile;
//! use mdserve_renderer::RenderPipeline;
//! use mdserve_storage::FileInfo;
//!
//! let info = FileInfo {
//!     name: "guide.md".to_owned(),
//!     size: 0,
//!     mode: 0o644,
//!     modified: SystemTime::UNIX_EPOCH,
//!     is_dir: false,
//! };
//! let pipeline = Arc::new(RenderPipeline::standard(None)?);
//! let mut source = Cursor::new(b"Title: Hello\n\n# Heading\n".to_vec());
//!
//! let file = RenderedFile::load("/guide.md", info, &mut source, pipeline)?;
//!
//! assert_eq!(file.title(), "Hello");
//! assert!(file.body().contains(r#"<h1 id="heading">"#));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod attributes;
mod error;
mod file;
mod front_matter;
mod title;

pub use attributes::Attributes;
pub use error::DocumentError;
pub use file::RenderedFile;
pub use front_matter::{FrontMatter, parse as parse_front_matter};
pub use title::title_from_filename;
