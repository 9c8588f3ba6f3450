//! Tower middleware.

mod markdown;
pub(crate) mod security;

pub use markdown::{MarkdownLayer, MarkdownService};
