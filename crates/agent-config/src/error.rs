//! Error types for configuration reload and status operations

use std::path::PathBuf;
use thiserror::Error;

/// Configuration specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file is missing
    #[error("configuration file does not exist: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The configuration file exists but could not be read
    #[error("failed to load configuration file {}: {reason}", .path.display())]
    LoadFailed {
        path: PathBuf,
        reason: String,
    },

    /// The configuration file was read but contributed no entries
    #[error("configuration file {} contains no entries", .0.display())]
    EmptyFile(PathBuf),

    /// A configuration value could not be interpreted
    #[error("invalid value for {key}: {reason}")]
    InvalidValue {
        key: String,
        reason: String,
    },

    /// A shared lock was poisoned by a panicking writer
    #[error("Lock error: {0}")]
    Lock(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/srv/app/.env"));
        assert_eq!(err.to_string(), "configuration file does not exist: /srv/app/.env");

        let err = ConfigError::InvalidValue {
            key: "TRADINGAGENTS_CACHE_TYPE".to_string(),
            reason: "expected redis/memory/none".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value for TRADINGAGENTS_CACHE_TYPE: expected redis/memory/none"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ConfigError = io.into();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
