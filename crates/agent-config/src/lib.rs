//! Environment configuration reload and validation
//!
//! This crate owns the runtime configuration of the stock-analysis agents:
//!
//! - Loading key/value pairs from the project's `.env` file
//! - A shared [`ConfigStore`] holding immutable [`EnvSnapshot`]s
//! - Change detection for a fixed set of tracked keys
//! - Per-key format validation and aggregate health checks
//! - Masking of credentials in every displayed value
//! - Notification of in-process components after a reload
//!
//! # Architecture
//!
//! The application root creates one [`ConfigStore`] and one [`ConfigReloader`]
//! and hands them to whoever needs configuration. A reload reads the file,
//! installs a new snapshot in the store and re-initializes every registered
//! [`ReloadListener`]. Status queries are read-only and recomputed each time.

pub mod dotenv;
pub mod error;
pub mod health;
pub mod keys;
pub mod listener;
pub mod mask;
pub mod reloader;
pub mod settings;
pub mod status;
pub mod store;
pub mod validation;

// Re-export main types for convenience
pub use error::{ConfigError, Result};
pub use health::{HealthSummary, OverallStatus};
pub use keys::KeyGroup;
pub use listener::{PropagationOutcome, ReloadListener};
pub use mask::mask_value;
pub use reloader::{
    ChangeKind, ChangeRecord, ConfigReloader, ReloadOutcome, ReloadReport, ReloadStats,
};
pub use settings::{CacheType, RuntimeSettings, SettingsManager};
pub use status::{ConfigStatus, EnvFileInfo, GroupCounts, KeyStatus, StatusResponse};
pub use store::{ConfigStore, EnvSnapshot};
pub use validation::{Level, Validation};
