//! Read-only configuration status report

use crate::error::{ConfigError, Result};
use crate::health::HealthSummary;
use crate::keys::KeyGroup;
use crate::mask::mask_value;
use crate::store::EnvSnapshot;
use crate::validation::{self, Validation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Status of a single tracked key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyStatus {
    pub key: String,
    pub configured: bool,
    /// Display value, masked for sensitive keys
    pub value: String,
    pub validation: Validation,
}

impl KeyStatus {
    pub fn inspect(key: &str, snapshot: &EnvSnapshot) -> Self {
        let value = snapshot.value(key);
        Self {
            key: key.to_string(),
            configured: !value.is_empty(),
            value: mask_value(key, value),
            validation: validation::validate(key, value),
        }
    }
}

/// Metadata of the configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvFileInfo {
    pub path: PathBuf,
    pub exists: bool,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
}

impl EnvFileInfo {
    /// Stat `path`; a missing file is reported, any other IO error is returned
    pub fn inspect(path: &Path) -> Result<Self> {
        match std::fs::metadata(path) {
            Ok(metadata) => Ok(Self {
                path: path.to_path_buf(),
                exists: true,
                size: metadata.len(),
                modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self {
                path: path.to_path_buf(),
                exists: false,
                size: 0,
                modified: None,
            }),
            Err(e) => Err(ConfigError::Io(e)),
        }
    }
}

/// Configured/total count for a key group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCounts {
    pub configured: usize,
    pub total: usize,
}

/// Full configuration status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigStatus {
    pub env_file: EnvFileInfo,
    pub last_reload_time: Option<DateTime<Utc>>,
    pub api_keys: Vec<KeyStatus>,
    pub database_config: Vec<KeyStatus>,
    pub system_config: Vec<KeyStatus>,
    pub validation_results: HealthSummary,
    /// How to create the configuration file when it is missing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub setup_hint: Option<String>,
}

impl ConfigStatus {
    /// Build the report for `snapshot`
    pub fn collect(
        snapshot: &EnvSnapshot,
        env_file: EnvFileInfo,
        env_example: &Path,
        last_reload_time: Option<DateTime<Utc>>,
    ) -> Self {
        let inspect_group = |group: KeyGroup| {
            group
                .keys()
                .iter()
                .map(|key| KeyStatus::inspect(key, snapshot))
                .collect::<Vec<_>>()
        };

        let setup_hint = (!env_file.exists).then(|| {
            if env_example.exists() {
                format!(
                    "copy {} to {} and configure your API keys",
                    env_example.display(),
                    env_file.path.display()
                )
            } else {
                format!("create {} and configure your API keys", env_file.path.display())
            }
        });

        Self {
            env_file,
            last_reload_time,
            api_keys: inspect_group(KeyGroup::ApiKeys),
            database_config: inspect_group(KeyGroup::Database),
            system_config: inspect_group(KeyGroup::System),
            validation_results: HealthSummary::evaluate(snapshot),
            setup_hint,
        }
    }

    pub fn group(&self, group: KeyGroup) -> &[KeyStatus] {
        match group {
            KeyGroup::ApiKeys => &self.api_keys,
            KeyGroup::Database => &self.database_config,
            KeyGroup::System => &self.system_config,
        }
    }

    pub fn counts(&self, group: KeyGroup) -> GroupCounts {
        let keys = self.group(group);
        GroupCounts {
            configured: keys.iter().filter(|k| k.configured).count(),
            total: keys.len(),
        }
    }

    /// Status of a tracked key
    pub fn key(&self, key: &str) -> Option<&KeyStatus> {
        KeyGroup::of(key).and_then(|group| self.group(group).iter().find(|k| k.key == key))
    }
}

/// Status query result as handed to display layers
///
/// A failed query carries only the error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatusResponse {
    Ok(Box<ConfigStatus>),
    Error { error: String },
}

impl From<Result<ConfigStatus>> for StatusResponse {
    fn from(result: Result<ConfigStatus>) -> Self {
        match result {
            Ok(status) => Self::Ok(Box::new(status)),
            Err(e) => Self::Error {
                error: e.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys;
    use crate::validation::Level;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_inspect_missing_file() {
        let dir = tempdir().unwrap();
        let info = EnvFileInfo::inspect(&dir.path().join(".env")).unwrap();
        assert!(!info.exists);
        assert_eq!(info.size, 0);
        assert!(info.modified.is_none());
    }

    #[test]
    fn test_inspect_existing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "A=1\n").unwrap();

        let info = EnvFileInfo::inspect(&path).unwrap();
        assert!(info.exists);
        assert_eq!(info.size, 4);
        assert!(info.modified.is_some());
    }

    #[test]
    fn test_collect_masks_and_counts() {
        let dir = tempdir().unwrap();
        let snapshot = EnvSnapshot::empty().with_entries([
            (keys::FINNHUB_API_KEY, "finnhub-0123456789"),
            (keys::MONGODB_URL, "mongodb://db:27017"),
            (keys::CACHE_TYPE, "redis"),
            (keys::LOG_LEVEL, "INFO"),
        ]);
        let info = EnvFileInfo::inspect(&dir.path().join(".env")).unwrap();
        let status = ConfigStatus::collect(&snapshot, info, &dir.path().join(".env.example"), None);

        let finnhub = status.key(keys::FINNHUB_API_KEY).unwrap();
        assert!(finnhub.configured);
        assert_eq!(finnhub.value, "finn**********6789");

        let cache = status.key(keys::CACHE_TYPE).unwrap();
        assert_eq!(cache.value, "redis");

        let openai = status.key(keys::OPENAI_API_KEY).unwrap();
        assert!(!openai.configured);
        assert_eq!(openai.validation.level, Level::Warning);

        assert_eq!(status.counts(KeyGroup::ApiKeys), GroupCounts { configured: 1, total: 9 });
        assert_eq!(status.counts(KeyGroup::Database), GroupCounts { configured: 2, total: 3 });
        assert_eq!(status.counts(KeyGroup::System), GroupCounts { configured: 1, total: 4 });
        assert!(status.setup_hint.as_deref().unwrap().starts_with("create"));
    }

    #[test]
    fn test_setup_hint_mentions_example() {
        let dir = tempdir().unwrap();
        let example = dir.path().join(".env.example");
        fs::write(&example, "DASHSCOPE_API_KEY=\n").unwrap();

        let info = EnvFileInfo::inspect(&dir.path().join(".env")).unwrap();
        let status = ConfigStatus::collect(&EnvSnapshot::empty(), info, &example, None);
        assert!(status.setup_hint.unwrap().starts_with("copy"));
    }

    #[test]
    fn test_error_response_has_only_error_field() {
        let response = StatusResponse::from(Err::<ConfigStatus, _>(ConfigError::Lock(
            "poisoned".to_string(),
        )));
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "Lock error: poisoned" }));
    }
}
