//! Configuration management for mdserve.
//!
//! Parses `mdserve.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! ```toml
//! [server]
//! host = "127.0.0.1"
//! port = 8080
//!
//! [docs]
//! root = "docs"
//! prefix = "/docs/"
//! mode = "standalone"
//!
//! [render]
//! toc = true
//! highlight_theme = "InspiredGitHub"
//! template = "page.html"
//! ```
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! String configuration values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `server.host`
//! - `docs.root`
//! - `docs.prefix`
//! - `render.template`

mod expand;

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override server host.
    pub host: Option<String>,
    /// Override server port.
    pub port: Option<u16>,
    /// Override served root directory.
    pub root: Option<PathBuf>,
    /// Override URL prefix.
    pub prefix: Option<String>,
    /// Override serving mode.
    pub mode: Option<ServeMode>,
    /// Override table of contents generation.
    pub toc: Option<bool>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdserve.toml";

/// Highlighting theme used when none is configured.
const DEFAULT_HIGHLIGHT_THEME: &str = "InspiredGitHub";

/// How non-Markdown requests are handled.
#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    /// Only Markdown is rendered; other files are reachable solely through
    /// directory fallback.
    #[default]
    Standalone,
    /// Markdown is rendered in front of a static file server for the whole
    /// tree.
    Middleware,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Document tree configuration (paths are relative strings from TOML).
    docs: DocsConfigRaw,
    /// Rendering configuration (paths are relative strings from TOML).
    render: RenderConfigRaw,

    /// Resolved document tree configuration (set after loading).
    #[serde(skip)]
    pub docs_resolved: DocsConfig,
    /// Resolved rendering configuration (set after loading).
    #[serde(skip)]
    pub render_resolved: RenderConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Server configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_owned(),
            port: 8080,
        }
    }
}

/// Raw docs configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct DocsConfigRaw {
    root: Option<String>,
    prefix: Option<String>,
    mode: Option<ServeMode>,
}

/// Resolved document tree configuration.
#[derive(Debug, Default)]
pub struct DocsConfig {
    /// Directory served as the filesystem root.
    pub root: PathBuf,
    /// URL prefix stripped from request paths.
    pub prefix: String,
    /// Serving mode.
    pub mode: ServeMode,
}

/// Raw render configuration as parsed from TOML.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct RenderConfigRaw {
    toc: Option<bool>,
    highlight_theme: Option<String>,
    template: Option<String>,
}

/// Resolved rendering configuration.
#[derive(Debug)]
pub struct RenderConfig {
    /// Generate a table of contents for each page.
    pub toc: bool,
    /// Syntax highlighting theme name.
    pub highlight_theme: String,
    /// Page template file (`None` uses the built-in template).
    pub template: Option<PathBuf>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            toc: true,
            highlight_theme: DEFAULT_HIGHLIGHT_THEME.to_owned(),
            template: None,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`server.host`").
        field: String,
        /// Error message (e.g., "${`MDSERVE_HOST`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdserve.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values. The result is
    /// validated after overrides are applied.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the final configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(host) = &settings.host {
            self.server.host.clone_from(host);
        }
        if let Some(port) = settings.port {
            self.server.port = port;
        }
        if let Some(root) = &settings.root {
            self.docs_resolved.root.clone_from(root);
        }
        if let Some(prefix) = &settings.prefix {
            self.docs_resolved.prefix.clone_from(prefix);
        }
        if let Some(mode) = settings.mode {
            self.docs_resolved.mode = mode;
        }
        if let Some(toc) = settings.toc {
            self.render_resolved.toc = toc;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            server: ServerConfig::default(),
            docs: DocsConfigRaw::default(),
            render: RenderConfigRaw::default(),
            docs_resolved: DocsConfig {
                root: base.join("docs"),
                prefix: "/".to_owned(),
                mode: ServeMode::default(),
            },
            render_resolved: RenderConfig::default(),
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_docs()?;
        require_non_empty(&self.render_resolved.highlight_theme, "render.highlight_theme")?;
        Ok(())
    }

    /// Validate server configuration.
    fn validate_server(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.server.host, "server.host")?;

        if self.server.port == 0 {
            return Err(ConfigError::Validation(
                "server.port cannot be 0".to_owned(),
            ));
        }

        Ok(())
    }

    /// Validate docs configuration.
    fn validate_docs(&self) -> Result<(), ConfigError> {
        if !self.docs_resolved.prefix.starts_with('/') {
            return Err(ConfigError::Validation(
                "docs.prefix must start with /".to_owned(),
            ));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        self.server.host = expand::expand_env(&self.server.host, "server.host")?;

        if let Some(ref root) = self.docs.root {
            self.docs.root = Some(expand::expand_env(root, "docs.root")?);
        }
        if let Some(ref prefix) = self.docs.prefix {
            self.docs.prefix = Some(expand::expand_env(prefix, "docs.prefix")?);
        }
        if let Some(ref template) = self.render.template {
            self.render.template = Some(expand::expand_env(template, "render.template")?);
        }

        Ok(())
    }

    /// Resolve relative paths against the config directory and fill in
    /// defaults.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.docs_resolved = DocsConfig {
            root: config_dir.join(self.docs.root.as_deref().unwrap_or("docs")),
            prefix: self.docs.prefix.clone().unwrap_or_else(|| "/".to_owned()),
            mode: self.docs.mode.unwrap_or_default(),
        };

        self.render_resolved = RenderConfig {
            toc: self.render.toc.unwrap_or(true),
            highlight_theme: self
                .render
                .highlight_theme
                .clone()
                .unwrap_or_else(|| DEFAULT_HIGHLIGHT_THEME.to_owned()),
            template: self.render.template.as_deref().map(|t| config_dir.join(t)),
        };
    }
}
