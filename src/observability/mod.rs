//! Observability utilities for buildah operations.
//!
//! Structured runtime logging goes through `tracing`. This module adds a
//! markdown audit log that records every operation the pipeline runs: the
//! full command line, exit code and captured output.
//!
//! # Example
//!
//! ```no_run
//! use cbk::observability::Logger;
//!
//! let logger = Logger::new(None, Some("DEBUG")).unwrap();
//! logger
//!     .log_command_execution("containers", "buildah containers --json", "[]", "", 0)
//!     .unwrap();
//! ```

pub mod logger;

// Re-export main types for convenience
pub use logger::Logger;
