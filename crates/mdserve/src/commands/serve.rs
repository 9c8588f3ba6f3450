//! `mdserve serve` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdserve_config::{CliSettings, Config, ServeMode};
use mdserve_server::{run_server, server_config_from_config};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the serve command.
#[derive(Args)]
pub(crate) struct ServeArgs {
    /// Path to configuration file (default: auto-discover mdserve.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory to serve (overrides config).
    #[arg(short, long)]
    root: Option<PathBuf>,

    /// URL prefix stripped from request paths (overrides config).
    #[arg(long)]
    prefix: Option<String>,

    /// Host to bind to (overrides config).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind to (overrides config).
    #[arg(short, long)]
    port: Option<u16>,

    /// Serve static files and only intercept `.md` requests.
    #[arg(long)]
    middleware: bool,

    /// Disable the table of contents.
    #[arg(long)]
    no_toc: bool,

    /// Enable verbose output (request tracing).
    #[arg(short, long)]
    pub verbose: bool,
}

impl ServeArgs {
    /// Execute the serve command.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration fails or the server fails to start.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            host: self.host,
            port: self.port,
            root: self.root,
            prefix: self.prefix,
            mode: self.middleware.then_some(ServeMode::Middleware),
            toc: self.no_toc.then_some(false),
        };

        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;

        if !config.docs_resolved.root.is_dir() {
            return Err(CliError::Validation(format!(
                "Root directory not found: {}",
                config.docs_resolved.root.display()
            )));
        }

        output.highlight(&format!(
            "Serving {} on http://{}:{}{}",
            config.docs_resolved.root.display(),
            config.server.host,
            config.server.port,
            config.docs_resolved.prefix
        ));
        output.field("Mode", format!("{:?}", config.docs_resolved.mode));
        output.field(
            "Table of contents",
            if config.render_resolved.toc { "enabled" } else { "disabled" },
        );
        if let Some(template) = &config.render_resolved.template {
            output.field("Template", template.display());
        }
        if let Some(path) = &config.config_path {
            output.field("Config", path.display());
        }

        run_server(server_config_from_config(&config))
            .await
            .map_err(|e| CliError::Server(e.to_string()))?;

        Ok(())
    }
}
