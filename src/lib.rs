//! Container Build Kit (CBK) - Declarative buildah operations
//!
//! CBK turns structured parameter sets into `buildah` invocations. Each
//! operation (add, commit, config, containers, images, mount, push, rm, rmi,
//! run) is a declarative table; one builder, one invoker and one outcome
//! translator are shared by all of them.
//!
//! - **`command`** - Operation tables, parameter sets and the argument builder
//! - **`outcome`** - Exit status + change policy -> uniform result
//! - **`executor`** - Process invocation with cancellation
//! - **`pipeline`** - The `Buildah` client: build, invoke, translate
//! - **`config`** - Configuration and environment loading
//! - **`observability`** - Markdown audit log of every operation
//! - **`cli`** - The `cbk` command-line front end
//!
//! # Features
//!
//! Enable the features you need in your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! cbk = { version = "0.1", default-features = false }    # builder + translator only
//! cbk = { version = "0.1" }                              # + executor and pipeline
//! cbk = { version = "0.1", features = ["all"] }          # everything, including the CLI
//! ```
//!
//! # Example: planning an operation
//!
//! ```
//! use cbk::command::{build, builtin_registry, CommandRegistry, ParameterSet};
//!
//! let spec = builtin_registry().get("rm").unwrap();
//! let argv = build(spec, &ParameterSet::new().with("all", true)).unwrap();
//! assert_eq!(argv.as_slice(), ["rm", "--all"]);
//! ```
//!
//! # Example: running an operation
//!
//! ```ignore
//! use cbk::prelude::*;
//!
//! let buildah = Buildah::new();
//! let params = ParameterSet::new()
//!     .with("container", "working-container")
//!     .with("image_name", "myimage:latest");
//!
//! let report = buildah.execute("commit", &params).await?.into_result()?;
//! assert!(report.changed());
//! ```

#![warn(missing_docs)]

pub mod command;
pub mod error;
pub mod outcome;

/// Process invocation (enabled with the `executor` feature)
#[cfg(feature = "executor")]
pub mod executor;

/// The operation pipeline (enabled with the `executor` feature)
#[cfg(feature = "executor")]
pub mod pipeline;

/// Configuration management (enabled with the `config` feature)
#[cfg(feature = "config")]
pub mod config;

/// Observability utilities (enabled with the `observability` feature)
#[cfg(feature = "observability")]
pub mod observability;

/// Command-line front end (enabled with the `cli` feature)
#[cfg(feature = "cli")]
pub mod cli;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::command::{
        build, builtin_registry, ArgumentVector, BuildError, ChangePolicy, CommandRegistry,
        OperationSpec, ParamValue, ParameterSet,
    };
    pub use crate::error::{CbkError, CbkResult};
    pub use crate::outcome::{translate, Outcome};

    #[cfg(feature = "executor")]
    pub use crate::executor::{ExecutionResult, InvocationError, Invoke, ProcessInvoker};

    #[cfg(feature = "executor")]
    pub use crate::pipeline::{Buildah, OperationReport};

    #[cfg(feature = "config")]
    pub use crate::config::{Configuration, ConfigurationLoader, EnvironmentLoader};

    #[cfg(feature = "observability")]
    pub use crate::observability::Logger;
}
