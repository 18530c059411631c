//! Shared utilities for agent-rs
//!
//! This crate provides common functionality used across the agent-rs workspace:
//! tracing bootstrap driven by the configured log level, and resolution of the
//! project root and the `.env` file the configuration reloader reads.

pub mod config;
pub mod logging;

pub use config::{ENV_FILE_NAME, ENV_EXAMPLE_FILE_NAME, PROJECT_ROOT_VAR, ProjectPaths};
pub use logging::{LogLevel, ParseLogLevelError, init_tracing, init_tracing_with_level};
