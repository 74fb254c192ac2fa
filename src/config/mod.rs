//! Configuration management for cbk.
//!
//! This module provides configuration loading through TOML files and
//! environment variable management via `.env` files.
//!
//! # Example
//!
//! ```no_run
//! use cbk::command::CommandRegistry;
//! use cbk::config::{ConfigurationLoader, EnvironmentLoader};
//! use std::path::Path;
//!
//! let env = EnvironmentLoader::new(None);
//!
//! let mut loader = ConfigurationLoader::new(Some(Path::new("cbk.toml"))).unwrap();
//! env.apply(&mut loader.config);
//!
//! println!("Binary: {}", loader.config.buildah.binary);
//! println!("Operations: {}", loader.registry().unwrap().names().join(", "));
//! ```

pub mod config;
pub mod environment;

// Re-export main types for convenience
pub use self::config::{
    BuildahConfig, Configuration, ConfigurationLoader, ExecutionConfig, LoggingConfig,
};
pub use self::environment::EnvironmentLoader;
