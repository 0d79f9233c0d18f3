//! Project configuration (`tailor.yml`).
//!
//! A project is any directory holding a `tailor.yml`. Commands locate it by
//! walking up from the working directory, the same way git finds its root,
//! unless an explicit path is given on the command line or through the
//! `TAILOR_CONFIG` environment variable.
//!
//! ```yaml
//! base_resume: resume.md
//! default_theme: even
//! themes:
//!   - even
//!   - stackoverflow
//! default_model: sonnet
//! agent:
//!   command: claude
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// File name searched for during walk-up discovery.
pub const CONFIG_FILE_NAME: &str = "tailor.yml";

/// Environment variable that may point at a config file.
pub const CONFIG_ENV_VAR: &str = "TAILOR_CONFIG";

/// Top-level project configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Path to the base resume, relative to the project root or absolute.
    pub base_resume: String,

    /// Theme used when rendering unless overridden.
    pub default_theme: String,

    /// Installed theme identifiers, in installation order.
    #[serde(default)]
    pub themes: Vec<String>,

    /// Model identifier handed to the agent when none is given per run.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,

    /// Text-generation agent invocation.
    #[serde(default)]
    pub agent: AgentConfig,
}

/// How to invoke the external text-generation agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Executable name or path.
    #[serde(default = "default_agent_command")]
    pub command: String,

    /// Extra arguments placed before Tailor's own.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

fn default_agent_command() -> String {
    "claude".to_string()
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: default_agent_command(),
            args: Vec::new(),
        }
    }
}

impl Config {
    /// Creates a configuration with a single installed theme.
    pub fn new(base_resume: impl Into<String>, default_theme: impl Into<String>) -> Self {
        let default_theme = default_theme.into();
        Self {
            base_resume: base_resume.into(),
            themes: vec![default_theme.clone()],
            default_theme,
            default_model: None,
            agent: AgentConfig::default(),
        }
    }

    /// Loads configuration from a YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading configuration from file");
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Io(e)
            }
        })?;
        Self::parse_yaml(&content)
    }

    /// Parses configuration from a YAML string.
    pub fn parse_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        debug!(
            base_resume = %config.base_resume,
            themes = config.themes.len(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Writes the configuration to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        debug!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Rejects configurations that list the same theme twice.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for theme in &self.themes {
            if !seen.insert(theme.as_str()) {
                return Err(ConfigError::DuplicateTheme(theme.clone()));
            }
        }
        Ok(())
    }

    /// Returns true if `theme` is installed.
    pub fn has_theme(&self, theme: &str) -> bool {
        self.themes.iter().any(|t| t == theme)
    }

    /// Records a newly installed theme.
    pub fn add_theme(&mut self, theme: impl Into<String>) -> Result<(), ConfigError> {
        let theme = theme.into();
        if self.has_theme(&theme) {
            return Err(ConfigError::DuplicateTheme(theme));
        }
        self.themes.push(theme);
        Ok(())
    }

    /// Switches the default theme to an installed one.
    pub fn set_default_theme(&mut self, theme: &str) -> Result<(), ConfigError> {
        if !self.has_theme(theme) {
            return Err(ConfigError::UnknownTheme(theme.to_string()));
        }
        self.default_theme = theme.to_string();
        Ok(())
    }

    /// Resolves `base_resume` against the project root.
    pub fn resolve_base_resume(&self, project_root: &Path) -> PathBuf {
        let path = Path::new(&self.base_resume);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            project_root.join(path)
        }
    }

    /// Picks the per-run model, falling back to `default_model`.
    pub fn effective_model<'a>(&'a self, override_model: Option<&'a str>) -> Option<&'a str> {
        override_model
            .filter(|m| !m.is_empty())
            .or(self.default_model.as_deref())
    }
}

/// Finds `tailor.yml` in `start_dir` or the nearest ancestor holding one.
pub fn find_config(start_dir: impl AsRef<Path>) -> Result<PathBuf, ConfigError> {
    let start_dir = start_dir.as_ref();
    let start = std::path::absolute(start_dir)?;

    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            debug!(path = %candidate.display(), "Found configuration");
            return Ok(candidate);
        }
    }

    Err(ConfigError::NotFound(start.join(CONFIG_FILE_NAME)))
}

/// Resolves the config path from the command-line flag, `TAILOR_CONFIG`, or
/// walk-up discovery, in that order.
pub fn find_with_overrides(
    flag: Option<&Path>,
    start_dir: impl AsRef<Path>,
) -> Result<PathBuf, ConfigError> {
    resolve_config_path(flag, std::env::var_os(CONFIG_ENV_VAR), start_dir)
}

/// Precedence logic behind [`find_with_overrides`].
///
/// The flag path is returned verbatim, without an existence check. Empty
/// values are treated as absent.
pub fn resolve_config_path(
    flag: Option<&Path>,
    env_value: Option<OsString>,
    start_dir: impl AsRef<Path>,
) -> Result<PathBuf, ConfigError> {
    if let Some(flag) = flag.filter(|p| !p.as_os_str().is_empty()) {
        debug!(path = %flag.display(), source = "flag", "Using config path");
        return Ok(flag.to_path_buf());
    }

    if let Some(env_value) = env_value.filter(|v| !v.is_empty()) {
        let path = PathBuf::from(env_value);
        debug!(path = %path.display(), source = CONFIG_ENV_VAR, "Using config path");
        return Ok(path);
    }

    find_config(start_dir)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Theme '{0}' is listed more than once")]
    DuplicateTheme(String),

    #[error("Theme '{0}' is not installed")]
    UnknownTheme(String),
}
