//! Declarative command specs and the argument builder.
//!
//! Every buildah operation is described by an [`OperationSpec`]: a
//! subcommand, ordered [`OptionRule`]s, ordered positional rules, exclusion
//! and required-one-of groups, and a [`ChangePolicy`]. A single
//! data-driven [`build`] function interprets those tables, so adding an
//! operation means adding a table, not another if-chain.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐    ┌──────────────────────┐
//! │ ParameterSet │    │ CommandRegistry      │
//! │ (per call)   │    │ (built-in tables +   │
//! └──────┬───────┘    │  config overrides)   │
//!        │            └──────────┬───────────┘
//!        │     OperationSpec     │
//!        └─────────┬─────────────┘
//!                  ▼
//!        ┌───────────────────┐
//!        │ build()           │ -> ArgumentVector | BuildError
//!        └───────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```
//! use cbk::command::{build, builtin_registry, CommandRegistry, ParameterSet};
//! use serde_json::json;
//!
//! let spec = builtin_registry().get("add").unwrap();
//! let params = ParameterSet::from_json(json!({
//!     "container": "c1",
//!     "src": "a.txt",
//!     "dest": "/tmp/a.txt",
//!     "chown": "1000:1000"
//! })).unwrap();
//!
//! let argv = build(spec, &params).unwrap();
//! assert_eq!(argv.as_slice(), ["add", "--chown", "1000:1000", "c1", "a.txt", "/tmp/a.txt"]);
//! ```

mod builder;
mod error;
mod params;
mod registry;
mod rule;
mod spec;
pub mod tables;

pub use builder::{build, ArgumentVector};
pub use error::BuildError;
pub use params::{ParamValue, ParameterSet};
pub use registry::{builtin_registry, CommandRegistry, DefaultCommandRegistry, RegistryError};
pub use rule::{Arity, OptionRule, Polarity, ValueKind};
pub use spec::{ChangePolicy, OperationSpec};
