//! Typed runtime settings derived from the configuration store

use crate::error::{ConfigError, Result};
use crate::keys;
use crate::listener::ReloadListener;
use crate::store::EnvSnapshot;
use crate::validation::{CACHE_TYPES, parse_bool};
use agent_utils::LogLevel;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::RwLock;
use tracing::{debug, info};

/// Cache backend selected by `TRADINGAGENTS_CACHE_TYPE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheType {
    Redis,
    #[default]
    Memory,
    None,
}

impl FromStr for CacheType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "redis" => Ok(Self::Redis),
            "memory" => Ok(Self::Memory),
            "none" => Ok(Self::None),
            _ => Err(ConfigError::InvalidValue {
                key: keys::CACHE_TYPE.to_string(),
                reason: format!("'{}' is not one of {}", s, CACHE_TYPES.join("/")),
            }),
        }
    }
}

/// Runtime settings used by the rest of the application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeSettings {
    pub memory_enabled: bool,
    pub log_level: LogLevel,
    pub log_dir: Option<PathBuf>,
    pub results_dir: Option<PathBuf>,
    pub cache_type: CacheType,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            memory_enabled: true,
            log_level: LogLevel::Info,
            log_dir: None,
            results_dir: None,
            cache_type: CacheType::Memory,
        }
    }
}

impl RuntimeSettings {
    /// Derive settings from `snapshot`, using defaults for unset keys
    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self> {
        let defaults = Self::default();

        let memory_enabled = match snapshot.value(keys::MEMORY_ENABLED) {
            "" => defaults.memory_enabled,
            raw => parse_bool(raw).ok_or_else(|| ConfigError::InvalidValue {
                key: keys::MEMORY_ENABLED.to_string(),
                reason: format!("'{}' is not a boolean", raw),
            })?,
        };

        let log_level = match snapshot.value(keys::LOG_LEVEL) {
            "" => defaults.log_level,
            raw => raw.parse().map_err(|e: agent_utils::ParseLogLevelError| {
                ConfigError::InvalidValue {
                    key: keys::LOG_LEVEL.to_string(),
                    reason: e.to_string(),
                }
            })?,
        };

        let cache_type = match snapshot.value(keys::CACHE_TYPE) {
            "" => defaults.cache_type,
            raw => raw.parse()?,
        };

        Ok(Self {
            memory_enabled,
            log_level,
            log_dir: optional_path(snapshot, keys::LOG_DIR),
            results_dir: optional_path(snapshot, keys::RESULTS_DIR),
            cache_type,
        })
    }
}

fn optional_path(snapshot: &EnvSnapshot, key: &str) -> Option<PathBuf> {
    Some(snapshot.value(key))
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
}

/// Holds the current [`RuntimeSettings`] and refreshes them on reload
///
/// An invalid snapshot leaves the previous settings in place.
#[derive(Debug, Default)]
pub struct SettingsManager {
    current: RwLock<RuntimeSettings>,
}

impl SettingsManager {
    pub fn new(settings: RuntimeSettings) -> Self {
        Self {
            current: RwLock::new(settings),
        }
    }

    pub fn from_snapshot(snapshot: &EnvSnapshot) -> Result<Self> {
        Ok(Self::new(RuntimeSettings::from_snapshot(snapshot)?))
    }

    pub fn current(&self) -> RuntimeSettings {
        self.current
            .read()
            .map(|settings| settings.clone())
            .unwrap_or_default()
    }
}

impl ReloadListener for SettingsManager {
    fn name(&self) -> &str {
        "runtime-settings"
    }

    fn reinitialize(&self, snapshot: &EnvSnapshot) -> anyhow::Result<()> {
        let settings = RuntimeSettings::from_snapshot(snapshot)?;
        debug!(?settings, "Derived runtime settings");

        let mut current = self
            .current
            .write()
            .map_err(|e| ConfigError::Lock(e.to_string()))?;
        *current = settings;
        info!("Runtime settings reinitialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(pairs: &[(&str, &str)]) -> EnvSnapshot {
        EnvSnapshot::empty().with_entries(pairs.iter().copied())
    }

    #[test]
    fn test_defaults_for_empty_snapshot() {
        let settings = RuntimeSettings::from_snapshot(&EnvSnapshot::empty()).unwrap();
        assert_eq!(settings, RuntimeSettings::default());
    }

    #[test]
    fn test_parse_all_fields() {
        let settings = RuntimeSettings::from_snapshot(&snapshot(&[
            (keys::MEMORY_ENABLED, "0"),
            (keys::LOG_LEVEL, "debug"),
            (keys::LOG_DIR, "./logs"),
            (keys::RESULTS_DIR, "/var/results"),
            (keys::CACHE_TYPE, "Redis"),
        ]))
        .unwrap();

        assert!(!settings.memory_enabled);
        assert_eq!(settings.log_level, LogLevel::Debug);
        assert_eq!(settings.log_dir, Some(PathBuf::from("./logs")));
        assert_eq!(settings.results_dir, Some(PathBuf::from("/var/results")));
        assert_eq!(settings.cache_type, CacheType::Redis);
    }

    #[test]
    fn test_invalid_cache_type() {
        let err =
            RuntimeSettings::from_snapshot(&snapshot(&[(keys::CACHE_TYPE, "disk")])).unwrap_err();
        assert!(err.to_string().contains("TRADINGAGENTS_CACHE_TYPE"));
    }

    #[test]
    fn test_reinitialize_replaces_settings() {
        let manager = SettingsManager::default();
        manager
            .reinitialize(&snapshot(&[(keys::MEMORY_ENABLED, "false")]))
            .unwrap();
        assert!(!manager.current().memory_enabled);
    }

    #[test]
    fn test_failed_reinitialize_keeps_previous_settings() {
        let manager =
            SettingsManager::from_snapshot(&snapshot(&[(keys::LOG_LEVEL, "ERROR")])).unwrap();
        let result = manager.reinitialize(&snapshot(&[(keys::LOG_LEVEL, "LOUD")]));

        assert!(result.is_err());
        assert_eq!(manager.current().log_level, LogLevel::Error);
    }
}
