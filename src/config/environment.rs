//! Environment variable loading and management.
//!
//! Only two variables are read: `CBK_BUILDAH_BIN` overrides the configured
//! binary and `CBK_LOG_LEVEL` the configured log level.

use std::env;
use std::path::Path;

use super::config::Configuration;

/// Environment variable naming the buildah binary.
pub const BUILDAH_BIN_VAR: &str = "CBK_BUILDAH_BIN";

/// Environment variable naming the log level.
pub const LOG_LEVEL_VAR: &str = "CBK_LOG_LEVEL";

/// Loads environment variables from .env file and system environment.
#[derive(Debug, Clone)]
pub struct EnvironmentLoader {
    env_file: Option<String>,
}

impl EnvironmentLoader {
    /// Initialize the environment loader.
    ///
    /// # Arguments
    /// * `env_file` - Path to .env file. Nothing is loaded when None.
    pub fn new(env_file: Option<&Path>) -> Self {
        // Only an explicit path is loaded, so a stray .env in the working
        // directory cannot change which binary runs.
        if let Some(path) = env_file {
            if path.exists() {
                if let Err(e) = dotenv::from_path(path) {
                    tracing::warn!(path = %path.display(), error = %e, "failed to load .env file");
                }
            }
        }

        Self {
            env_file: env_file.map(|p| p.to_string_lossy().to_string()),
        }
    }

    /// The .env file this loader was created with.
    pub fn env_file(&self) -> Option<&str> {
        self.env_file.as_deref()
    }

    /// Binary override from the environment.
    pub fn buildah_binary(&self) -> Option<String> {
        non_empty_var(BUILDAH_BIN_VAR)
    }

    /// Log level override from the environment.
    pub fn log_level(&self) -> Option<String> {
        non_empty_var(LOG_LEVEL_VAR)
    }

    /// Apply environment overrides to a loaded configuration.
    pub fn apply(&self, config: &mut Configuration) {
        if let Some(binary) = self.buildah_binary() {
            config.buildah.binary = binary;
        }
        if let Some(level) = self.log_level() {
            config.logging.log_level = level;
        }
    }
}

impl Default for EnvironmentLoader {
    fn default() -> Self {
        Self::new(None)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}
