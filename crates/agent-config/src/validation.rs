//! Per-key validation rules

use crate::keys::{self, KeyGroup};
use agent_utils::LogLevel;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

static OPENAI_STYLE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sk-[a-zA-Z0-9]{48}$").expect("static pattern is valid")
});

static GOOGLE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9_-]{39}$").expect("static pattern is valid")
});

static DASHSCOPE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^sk-[a-zA-Z0-9]{24,32}$").expect("static pattern is valid")
});

/// Accepted cache backends
pub const CACHE_TYPES: &[&str] = &["redis", "memory", "none"];

/// Accepted boolean tokens
pub const BOOL_TOKENS: &[&str] = &["true", "false", "1", "0"];

/// Severity of a validation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Error,
    Info,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Success => "success",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Info => "info",
        };
        f.write_str(s)
    }
}

/// Outcome of validating a single value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Validation {
    pub valid: bool,
    pub message: String,
    pub level: Level,
}

impl Validation {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            valid: true,
            message: message.into(),
            level: Level::Success,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            level: Level::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            level: Level::Error,
        }
    }

    pub fn info(valid: bool, message: impl Into<String>) -> Self {
        Self {
            valid,
            message: message.into(),
            level: Level::Info,
        }
    }

    fn not_configured() -> Self {
        Self::warning("not configured")
    }
}

/// Validate `value` for any key
///
/// Tracked keys use their group's rule. Untracked keys that look like
/// credentials get the generic length check; anything else is informational.
pub fn validate(key: &str, value: &str) -> Validation {
    match KeyGroup::of(key) {
        Some(KeyGroup::ApiKeys) => validate_api_key(key, value),
        Some(KeyGroup::Database) => validate_database(key, value),
        Some(KeyGroup::System) => validate_system(key, value),
        None if keys::is_sensitive(key) => validate_api_key(key, value),
        None if value.is_empty() => Validation::info(false, "not configured"),
        None => Validation::info(true, "configured"),
    }
}

/// Validate a credential against its provider's format
pub fn validate_api_key(key: &str, value: &str) -> Validation {
    if value.is_empty() {
        return Validation::not_configured();
    }

    match key {
        keys::OPENAI_API_KEY | keys::DEEPSEEK_API_KEY => {
            if OPENAI_STYLE_KEY.is_match(value) {
                Validation::success("format looks correct")
            } else {
                Validation::error(
                    "invalid format, expected 'sk-' followed by 48 alphanumeric characters",
                )
            }
        }
        keys::GOOGLE_API_KEY => {
            if GOOGLE_KEY.is_match(value) {
                Validation::success("format looks correct")
            } else {
                Validation::error("invalid format, expected 39 alphanumeric characters")
            }
        }
        keys::DASHSCOPE_API_KEY => {
            if DASHSCOPE_KEY.is_match(value) {
                Validation::success("format looks correct")
            } else {
                Validation::error("invalid format, expected 'sk-' prefix")
            }
        }
        keys::VOLCENGINE_API_KEY | keys::CUSTOM_OPENAI_API_KEY | keys::OPENROUTER_API_KEY => {
            min_length(value, 20, "format probably correct", "key is too short")
        }
        keys::FINNHUB_API_KEY | keys::TUSHARE_TOKEN => {
            min_length(value, 10, "format probably correct", "token is too short")
        }
        _ => min_length(value, 10, "configured", "value is too short"),
    }
}

/// Validate a storage backend setting
pub fn validate_database(key: &str, value: &str) -> Validation {
    if value.is_empty() {
        return Validation::not_configured();
    }

    match key {
        keys::MONGODB_URL => {
            if value.starts_with("mongodb://") {
                Validation::success("MongoDB URL format is correct")
            } else {
                Validation::error("should start with mongodb://")
            }
        }
        keys::REDIS_URL => {
            if value.starts_with("redis://") {
                Validation::success("Redis URL format is correct")
            } else {
                Validation::error("should start with redis://")
            }
        }
        keys::CACHE_TYPE => {
            if CACHE_TYPES.contains(&value.to_ascii_lowercase().as_str()) {
                Validation::success(format!("cache type: {}", value))
            } else {
                Validation::error("should be one of redis/memory/none")
            }
        }
        _ => Validation::success("configured"),
    }
}

/// Validate a runtime setting
pub fn validate_system(key: &str, value: &str) -> Validation {
    if value.is_empty() {
        return match key {
            keys::MEMORY_ENABLED => {
                Validation::warning("not configured, memory defaults to enabled")
            }
            keys::LOG_LEVEL => Validation::warning("not configured, log level defaults to INFO"),
            keys::LOG_DIR | keys::RESULTS_DIR => {
                Validation::warning("not configured, using default path")
            }
            _ => Validation::not_configured(),
        };
    }

    match key {
        keys::MEMORY_ENABLED => match parse_bool(value) {
            Some(enabled) => Validation::success(format!(
                "memory: {}",
                if enabled { "enabled" } else { "disabled" }
            )),
            None => Validation::error("should be true/false"),
        },
        keys::LOG_LEVEL => match value.parse::<LogLevel>() {
            Ok(_) => Validation::success(format!("log level: {}", value)),
            Err(_) => Validation::error("should be DEBUG/INFO/WARNING/ERROR"),
        },
        keys::LOG_DIR | keys::RESULTS_DIR => validate_dir(value),
        _ => Validation::success("configured"),
    }
}

/// Parse one of [`BOOL_TOKENS`], case-insensitively
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}

fn min_length(value: &str, min: usize, ok: &str, short: &str) -> Validation {
    if value.chars().count() >= min {
        Validation::success(ok)
    } else {
        Validation::warning(short)
    }
}

/// A directory setting is usable when it exists or can be created in place
fn validate_dir(value: &str) -> Validation {
    let path = Path::new(value);
    let parent = match path.parent() {
        Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
        Some(parent) => parent.to_path_buf(),
        None => path.to_path_buf(),
    };

    if path.exists() || parent.exists() {
        Validation::success(format!("path: {}", value))
    } else {
        Validation::warning("path does not exist")
    }
}
