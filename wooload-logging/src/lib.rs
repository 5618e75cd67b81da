//! Logging infrastructure for wooload
//!
//! Every crate logs through `tracing`; this crate installs the global
//! subscriber from the logging configuration or a bare level string.

pub mod init;

pub use init::{build_env_filter, init_logging_from_config, init_simple_tracing};
