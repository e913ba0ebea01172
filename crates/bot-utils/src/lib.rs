//! Shared utilities for the Champion Trade bot
//!
//! Logging setup and the environment helpers the configuration layer is
//! built on.

pub mod config;
pub mod logging;

pub use config::{ConfigError, Environment, env_string, parse_var, require_var};
pub use logging::{LogLevel, LoggingConfig, init_tracing};
