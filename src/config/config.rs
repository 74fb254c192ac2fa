//! TOML configuration parsing and management.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::command::{DefaultCommandRegistry, OperationSpec};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Configuration {
    #[serde(default)]
    pub buildah: BuildahConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub execution: ExecutionConfig,
    /// Extra operation specs, or replacements for built-in ones.
    #[serde(default)]
    pub operations: Vec<OperationSpec>,
}

/// External tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildahConfig {
    /// Binary name or path. Bare names are looked up on `PATH`.
    #[serde(default = "default_binary")]
    pub binary: String,
    /// Working directory for spawned processes.
    #[serde(default)]
    pub working_dir: Option<PathBuf>,
}

fn default_binary() -> String {
    "buildah".to_string()
}

impl Default for BuildahConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            working_dir: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Markdown audit log. No audit log is written when unset.
    #[serde(default)]
    pub log_file: Option<String>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "INFO".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_file: None,
            log_level: default_log_level(),
        }
    }
}

/// Execution configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExecutionConfig {
    /// Caller-side timeout; 0 disables it.
    #[serde(default)]
    pub timeout_seconds: u64,
    #[serde(default)]
    pub check_mode: bool,
}

/// Loads and manages TOML configuration.
#[derive(Debug)]
pub struct ConfigurationLoader {
    pub config_path: PathBuf,
    pub config: Configuration,
}

impl ConfigurationLoader {
    /// Initialize configuration loader.
    ///
    /// # Arguments
    /// * `config_path` - Path to TOML config file. If None, uses the default
    ///   location, falling back to built-in defaults when it does not exist.
    ///   An explicit path that does not exist is an error.
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let (config_path, config) = match config_path {
            Some(path) => (path.to_path_buf(), Self::load_config(path)?),
            None => {
                let path = Self::default_config_path();
                let config = if path.exists() {
                    Self::load_config(&path)?
                } else {
                    Self::get_default_config()
                };
                (path, config)
            }
        };

        Ok(Self {
            config_path,
            config,
        })
    }

    /// Create a configuration loader from a pre-parsed Configuration.
    pub fn from_config(config: Configuration) -> Self {
        Self {
            config_path: Self::default_config_path(),
            config,
        }
    }

    /// `<config dir>/cbk/cbk.toml`, or `./cbk.toml` when the platform has
    /// no config directory.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .map(|dir| dir.join("cbk").join("cbk.toml"))
            .unwrap_or_else(|| PathBuf::from("cbk.toml"))
    }

    /// Load configuration from TOML file.
    fn load_config(path: &Path) -> Result<Configuration> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse TOML config: {}", path.display()))
    }

    /// Get default configuration.
    fn get_default_config() -> Configuration {
        Configuration::default()
    }

    /// Built-in operations with the configured `[[operations]]` applied on top.
    pub fn registry(&self) -> Result<DefaultCommandRegistry> {
        let mut registry = DefaultCommandRegistry::with_builtins();
        for spec in &self.config.operations {
            let name = spec.name.clone();
            if registry.register_or_replace(spec.clone())?.is_some() {
                tracing::debug!(operation = %name, "built-in operation overridden by config");
            }
        }
        Ok(registry)
    }
}
