//! `mdserve render` command implementation.
//!
//! Renders a single Markdown file through the same pipeline the server
//! uses and writes the HTML fragment (table of contents followed by the
//! body) to stdout or a file.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use mdserve_document::RenderedFile;
use mdserve_renderer::{DEFAULT_THEME, RenderPipeline};
use mdserve_storage::{DirFs, FileSystem};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render.
    file: PathBuf,

    /// Write HTML to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Syntax highlighting theme.
    #[arg(long, default_value = DEFAULT_THEME)]
    theme: String,

    /// Disable the table of contents.
    #[arg(long)]
    no_toc: bool,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the theme is unknown.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let pipeline = RenderPipeline::standard(Some(&self.theme))?.with_toc(!self.no_toc);
        let file = load(&self.file, Arc::new(pipeline))?;
        let html = format!("{}{}", file.toc(), file.body());

        match &self.output {
            Some(path) => {
                std::fs::write(path, html)?;
                Output::new().info(&format!("{} -> {}", file.title(), path.display()));
            }
            None => std::io::stdout().lock().write_all(html.as_bytes())?,
        }

        Ok(())
    }
}

/// Open `path` through a [`DirFs`] rooted at its parent directory.
fn load(path: &Path, pipeline: Arc<RenderPipeline>) -> Result<RenderedFile, CliError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| CliError::Validation(format!("Invalid file path: {}", path.display())))?;
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let fs = DirFs::new(parent);
    let mut handle = fs.open(name)?;
    let info = handle.stat()?;
    if info.is_dir {
        return Err(CliError::Validation(format!(
            "Not a file: {}",
            path.display()
        )));
    }

    Ok(RenderedFile::load(name, info, &mut *handle, pipeline)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_load_uses_front_matter_title() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.md");
        std::fs::write(&path, "Title: Release Notes\n\n# v1\n").unwrap();

        let file = load(&path, Arc::new(RenderPipeline::standard(None).unwrap())).unwrap();

        assert_eq!(file.title(), "Release Notes");
        assert_eq!(file.body(), "<h1 id=\"v1\">v1</h1>\n");
    }

    #[test]
    fn test_load_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();

        let result = load(dir.path(), Arc::new(RenderPipeline::standard(None).unwrap()));

        assert!(matches!(result, Err(CliError::Validation(_))));
    }

    #[test]
    fn test_execute_writes_output_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("page.md");
        let output = dir.path().join("page.html");
        std::fs::write(&input, "# Hello\n").unwrap();

        let args = RenderArgs {
            file: input,
            output: Some(output.clone()),
            theme: DEFAULT_THEME.to_owned(),
            no_toc: true,
        };
        args.execute().unwrap();

        assert_eq!(
            std::fs::read_to_string(output).unwrap(),
            "<h1 id=\"hello\">Hello</h1>\n"
        );
    }
}
