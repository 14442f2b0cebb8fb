//! Configuration management for infographic rendering.
//!
//! Parses `infographic.toml` with serde and discovers it in the current
//! directory or its parents. CLI settings are applied during load via
//! [`CliSettings`].
//!
//! ```toml
//! [render]
//! marker = "infographic"
//! width = "100%"
//! height = "auto"
//! on_error = "fail"
//!
//! [render.options]
//! theme = "dark"
//!
//! [renderer]
//! url = "${INFOGRAPHIC_URL:-http://localhost:3000/render}"
//! timeout_secs = 30
//! ```
//!
//! ## Environment Variable Expansion
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields: `renderer.url` and every entry of `renderer.command`.

mod expand;
mod policy;

use std::path::{Path, PathBuf};
use std::time::Duration;

use infographic::Options;
use infographic_render::{DEFAULT_TIMEOUT, Dimension};
use serde::Deserialize;
use serde_json::{Map, Value};

pub use policy::{ERROR_CLASS, OnError};

/// Configuration filename to search for.
pub const CONFIG_FILENAME: &str = "infographic.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Render service URL; replaces any configured command.
    pub url: Option<String>,
    /// Renderer program and arguments; replaces any configured URL.
    pub command: Option<Vec<String>>,
    pub on_error: Option<OnError>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pipeline settings.
    pub render: RenderConfig,
    /// Renderer selection.
    pub renderer: RendererConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// `[render]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Marker name recognized on code blocks.
    pub marker: String,
    /// Default width passed to the renderer.
    pub width: Dimension,
    /// Default height passed to the renderer.
    pub height: Dimension,
    /// Failure handling.
    pub on_error: OnError,
    /// Renderer-specific overrides, passed through unchanged.
    pub options: Map<String, Value>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            marker: infographic::consts::DEFAULT_MARKER.to_owned(),
            width: Dimension::full_width(),
            height: Dimension::auto(),
            on_error: OnError::default(),
            options: Map::new(),
        }
    }
}

/// `[renderer]` section.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    /// Render service endpoint.
    pub url: Option<String>,
    /// Renderer program followed by its arguments.
    pub command: Option<Vec<String>>,
    /// Per-render time limit in seconds.
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            url: None,
            command: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Renderer selected by the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RendererKind {
    /// POST to a render service.
    Http { url: String },
    /// Run a local renderer program.
    Command { program: String, args: Vec<String> },
}

impl RendererConfig {
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Resolve which renderer to build.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if neither `url` nor `command` is set.
    pub fn kind(&self) -> Result<RendererKind, ConfigError> {
        match (&self.url, self.command.as_deref()) {
            (Some(url), None) => Ok(RendererKind::Http { url: url.clone() }),
            (None, Some([program, args @ ..])) => Ok(RendererKind::Command {
                program: program.clone(),
                args: args.to_vec(),
            }),
            (None, Some([])) => Err(ConfigError::Validation(
                "renderer.command cannot be empty".to_owned(),
            )),
            (None, None) => Err(ConfigError::Validation(
                "renderer.url or renderer.command required (config file, --url or --command)"
                    .to_owned(),
            )),
            (Some(_), Some(_)) => Err(ConfigError::Validation(
                "renderer.url and renderer.command are mutually exclusive".to_owned(),
            )),
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
        /// Config field path (e.g., "`renderer.url`").
        field: String,
        /// Error message (e.g., "${`INFOGRAPHIC_URL`} not set").
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

/// Require a URL field to use http:// or https:// scheme.
fn require_http_url(url: &str, field: &str) -> Result<(), ConfigError> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "{field} must start with http:// or https://"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `infographic.toml` in the current directory and its parents, and
    /// falls back to defaults when none is found.
    ///
    /// CLI settings are applied after loading and before validation.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing or
    /// expansion fails, or the result is invalid.
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
            Self::default()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Pipeline options described by the `[render]` section.
    #[must_use]
    pub fn options(&self) -> Options {
        Options::default()
            .marker(self.render.marker.clone())
            .width(self.render.width.clone())
            .height(self.render.height.clone())
            .renderer_options(self.render.options.clone())
            .fallback_policy(self.render.on_error.fallback_policy())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_render()?;
        self.validate_renderer()?;
        Ok(())
    }

    fn validate_render(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.render.marker, "render.marker")?;
        if self.render.marker.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "render.marker cannot contain whitespace".to_owned(),
            ));
        }
        Ok(())
    }

    fn validate_renderer(&self) -> Result<(), ConfigError> {
        let renderer = &self.renderer;
        if renderer.url.is_some() && renderer.command.is_some() {
            return Err(ConfigError::Validation(
                "renderer.url and renderer.command are mutually exclusive".to_owned(),
            ));
        }
        if let Some(url) = &renderer.url {
            require_non_empty(url, "renderer.url")?;
            require_http_url(url, "renderer.url")?;
        }
        if let Some(command) = &renderer.command {
            let program = command.first().map_or("", String::as_str);
            require_non_empty(program, "renderer.command")?;
        }
        if renderer.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "renderer.timeout_secs must be greater than 0".to_owned(),
            ));
        }
        Ok(())
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(url) = &settings.url {
            self.renderer.url = Some(url.clone());
            self.renderer.command = None;
        }
        if let Some(command) = &settings.command {
            self.renderer.command = Some(command.clone());
            self.renderer.url = None;
        }
        if let Some(on_error) = settings.on_error {
            self.render.on_error = on_error;
        }
        if let Some(width) = &settings.width {
            self.render.width.clone_from(width);
        }
        if let Some(height) = &settings.height {
            self.render.height.clone_from(height);
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

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.expand_env_vars()?;
        config.config_path = Some(path.to_path_buf());
        Ok(config)
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(url) = &self.renderer.url {
            self.renderer.url = Some(expand::expand_env(url, "renderer.url")?);
        }
        if let Some(command) = &mut self.renderer.command {
            for (index, arg) in command.iter_mut().enumerate() {
                *arg = expand::expand_env(arg, &format!("renderer.command[{index}]"))?;
            }
        }
        Ok(())
    }
}
