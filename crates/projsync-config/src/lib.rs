use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

const CONFIG_DIR: &str = ".projsync";
const CONFIG_FILE: &str = "config.toml";

pub const DEFAULT_BREADCRUMB_SEPARATOR: &str = ";";
pub const DEFAULT_MAX_DELEGATION_DEPTH: usize = 1;

/// How `list-files` prints its result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format `{other}`, expected text or json")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => f.write_str("text"),
            OutputFormat::Json => f.write_str("json"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProjsyncConfig {
    /// Directory that listed paths are made relative to, instead of the
    /// current directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_directory: Option<String>,
    #[serde(default)]
    pub breadcrumbs: bool,
    #[serde(default = "default_breadcrumb_separator")]
    pub breadcrumb_separator: String,
    #[serde(default)]
    pub format: OutputFormat,
    #[serde(default = "default_max_delegation_depth")]
    pub max_delegation_depth: usize,
    /// Reject a Visual Studio project whose file stem is not the requested target.
    #[serde(default)]
    pub strict_target_names: bool,
}

impl Default for ProjsyncConfig {
    fn default() -> Self {
        Self {
            base_directory: None,
            breadcrumbs: false,
            breadcrumb_separator: default_breadcrumb_separator(),
            format: OutputFormat::default(),
            max_delegation_depth: DEFAULT_MAX_DELEGATION_DEPTH,
            strict_target_names: false,
        }
    }
}

impl ProjsyncConfig {
    pub fn load(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = config_path(root);
        let contents = fs::read_to_string(&path)?;
        let mut config: Self = toml::from_str(&contents)?;
        config.normalize();
        Ok(config)
    }

    pub fn load_or_default(root: impl AsRef<Path>) -> Result<Self, ConfigError> {
        match Self::load(root) {
            Ok(config) => Ok(config),
            Err(ConfigError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                Ok(Self::default())
            }
            Err(err) => Err(err),
        }
    }

    pub fn save(&self, root: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = config_path(&root);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let contents = toml::to_string_pretty(self)?;
        fs::write(&path, contents)?;
        Ok(())
    }

    /// The configured base directory, resolved against `root` when relative.
    pub fn base_directory(&self, root: impl AsRef<Path>) -> Option<PathBuf> {
        self.base_directory
            .as_deref()
            .map(|dir| root.as_ref().join(dir))
    }

    fn normalize(&mut self) {
        self.base_directory = self
            .base_directory
            .take()
            .map(|dir| dir.trim().to_string())
            .filter(|dir| !dir.is_empty());
        if self.breadcrumb_separator.is_empty() {
            self.breadcrumb_separator = default_breadcrumb_separator();
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse projsync configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Failed to serialize projsync configuration: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Location of the configuration file below `root`.
pub fn config_path(root: impl AsRef<Path>) -> PathBuf {
    root.as_ref().join(CONFIG_DIR).join(CONFIG_FILE)
}

fn default_breadcrumb_separator() -> String {
    DEFAULT_BREADCRUMB_SEPARATOR.to_string()
}

fn default_max_delegation_depth() -> usize {
    DEFAULT_MAX_DELEGATION_DEPTH
}
