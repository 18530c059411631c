//! Configuration reloader
//!
//! Re-reads the project's `.env` file into the [`ConfigStore`], reports which
//! tracked keys changed, and notifies registered [`ReloadListener`]s.
//!
//! # Example
//!
//! ```no_run
//! use agent_config::{ConfigReloader, ConfigStore, SettingsManager};
//! use agent_utils::ProjectPaths;
//! use std::sync::Arc;
//!
//! let store = Arc::new(ConfigStore::from_process_env());
//! let settings = Arc::new(SettingsManager::default());
//! let reloader = ConfigReloader::new(ProjectPaths::from_env()?, Arc::clone(&store))
//!     .with_listener(settings.clone());
//!
//! let outcome = reloader.reload();
//! println!("{}", outcome.message);
//!
//! let status = reloader.status()?;
//! println!("overall: {}", status.validation_results.overall_status);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use crate::dotenv;
use crate::error::{ConfigError, Result};
use crate::keys;
use crate::listener::{PropagationOutcome, ReloadListener};
use crate::mask::mask_value;
use crate::status::{ConfigStatus, EnvFileInfo, StatusResponse};
use crate::store::{ConfigStore, EnvSnapshot};
use crate::validation::{self, Validation};
use agent_utils::ProjectPaths;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{debug, error, info, warn};

/// How a tracked key changed during a reload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    New,
    Updated,
    Removed,
}

/// A tracked key whose value differs before and after a reload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    #[serde(rename = "type")]
    pub kind: ChangeKind,
    /// Masked previous value
    pub from: String,
    /// Masked new value
    pub to: String,
}

/// Statistics of one successful reload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadStats {
    pub total_changes: usize,
    pub new_keys: usize,
    pub updated_keys: usize,
    pub removed_keys: usize,
    pub changes: BTreeMap<String, ChangeRecord>,
    pub reload_time: DateTime<Utc>,
    /// Entries read from the file, tracked or not
    pub entries_loaded: usize,
    /// Lines skipped as malformed
    pub skipped_lines: usize,
}

impl ReloadStats {
    fn from_changes(
        changes: BTreeMap<String, ChangeRecord>,
        reload_time: DateTime<Utc>,
        entries_loaded: usize,
        skipped_lines: usize,
    ) -> Self {
        let count = |kind: ChangeKind| changes.values().filter(|c| c.kind == kind).count();
        Self {
            total_changes: changes.len(),
            new_keys: count(ChangeKind::New),
            updated_keys: count(ChangeKind::Updated),
            removed_keys: count(ChangeKind::Removed),
            changes,
            reload_time,
            entries_loaded,
            skipped_lines,
        }
    }
}

/// Successful reload: the store update and the listener notifications
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadReport {
    pub stats: ReloadStats,
    pub propagation: Vec<PropagationOutcome>,
}

impl ReloadReport {
    pub fn message(&self) -> String {
        match self.stats.total_changes {
            0 => "environment reloaded, no configuration changes detected".to_string(),
            n => format!("environment reloaded, {} configuration change(s) detected", n),
        }
    }

    /// Whether every listener accepted the new configuration
    pub fn fully_propagated(&self) -> bool {
        self.propagation.iter().all(|p| p.success)
    }
}

/// Reload result as handed to display layers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReloadOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<ReloadStats>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub propagation: Vec<PropagationOutcome>,
}

impl From<Result<ReloadReport>> for ReloadOutcome {
    fn from(result: Result<ReloadReport>) -> Self {
        match result {
            Ok(report) => Self {
                success: true,
                message: report.message(),
                stats: Some(report.stats),
                propagation: report.propagation,
            },
            Err(e) => Self {
                success: false,
                message: e.to_string(),
                stats: None,
                propagation: Vec::new(),
            },
        }
    }
}

/// Compare tracked keys between two snapshots
///
/// Values are masked before they are recorded.
pub fn diff_tracked(before: &EnvSnapshot, after: &EnvSnapshot) -> BTreeMap<String, ChangeRecord> {
    keys::tracked_keys()
        .filter_map(|key| {
            let old = before.value(key);
            let new = after.value(key);
            if old == new {
                return None;
            }
            let kind = match (old.is_empty(), new.is_empty()) {
                (true, _) => ChangeKind::New,
                (_, true) => ChangeKind::Removed,
                _ => ChangeKind::Updated,
            };
            Some((
                key.to_string(),
                ChangeRecord {
                    kind,
                    from: mask_value(key, old),
                    to: mask_value(key, new),
                },
            ))
        })
        .collect()
}

/// Reloads the configuration file into a [`ConfigStore`]
pub struct ConfigReloader {
    paths: ProjectPaths,
    store: Arc<ConfigStore>,
    listeners: Vec<Arc<dyn ReloadListener>>,
    last_reload: RwLock<Option<DateTime<Utc>>>,
}

impl std::fmt::Debug for ConfigReloader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let listeners: Vec<&str> = self.listeners.iter().map(|l| l.name()).collect();
        f.debug_struct("ConfigReloader")
            .field("env_file", &self.paths.env_file())
            .field("listeners", &listeners)
            .field("last_reload", &self.last_reload_time())
            .finish_non_exhaustive()
    }
}

impl ConfigReloader {
    /// Create a reloader for `paths.env_file()` writing into `store`
    pub fn new(paths: ProjectPaths, store: Arc<ConfigStore>) -> Self {
        info!(env_file = %paths.env_file().display(), "Configuration reloader initialized");
        Self {
            paths,
            store,
            listeners: Vec::new(),
            last_reload: RwLock::new(None),
        }
    }

    /// Register a component to re-initialize after every reload
    pub fn with_listener(mut self, listener: Arc<dyn ReloadListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn env_file(&self) -> &Path {
        self.paths.env_file()
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Time of the last successful reload
    pub fn last_reload_time(&self) -> Option<DateTime<Utc>> {
        self.last_reload.read().ok().and_then(|t| *t)
    }

    /// Reload and flatten the result for display
    pub fn reload(&self) -> ReloadOutcome {
        let result = self.try_reload();
        if let Err(e) = &result {
            error!(error = %e, "Environment reload failed");
        }
        result.into()
    }

    /// Reload the configuration file
    ///
    /// Fails without touching the store when the file is missing, unreadable or
    /// contributes no entries. Listener failures are recorded in the report and
    /// never fail the reload.
    pub fn try_reload(&self) -> Result<ReloadReport> {
        let env_file = self.paths.env_file();
        if !env_file.exists() {
            return Err(ConfigError::FileNotFound(env_file.to_path_buf()));
        }

        let before = self.store.snapshot();
        let parsed = dotenv::load(env_file, |name| before.get(name).map(str::to_string))?;
        if parsed.is_empty() {
            return Err(ConfigError::EmptyFile(env_file.to_path_buf()));
        }

        let entries_loaded = parsed.len();
        let skipped_lines = parsed.skipped().len();
        let after = self.store.apply(parsed.into_entries())?;

        let changes = diff_tracked(&before, &after);
        for (key, change) in &changes {
            debug!(key = %key, kind = ?change.kind, "Configuration key changed");
        }

        let propagation = self.propagate(&after);

        let reload_time = Utc::now();
        if let Ok(mut last) = self.last_reload.write() {
            *last = Some(reload_time);
        }

        let report = ReloadReport {
            stats: ReloadStats::from_changes(changes, reload_time, entries_loaded, skipped_lines),
            propagation,
        };
        info!(
            changes = report.stats.total_changes,
            entries = entries_loaded,
            "{}",
            report.message()
        );
        Ok(report)
    }

    fn propagate(&self, snapshot: &EnvSnapshot) -> Vec<PropagationOutcome> {
        self.listeners
            .iter()
            .map(|listener| match listener.reinitialize(snapshot) {
                Ok(()) => {
                    info!(listener = listener.name(), "Listener reinitialized");
                    PropagationOutcome::succeeded(listener.name())
                }
                Err(e) => {
                    warn!(
                        listener = listener.name(),
                        error = %e,
                        "Listener failed to reinitialize"
                    );
                    PropagationOutcome::failed(listener.name(), e.to_string())
                }
            })
            .collect()
    }

    /// Current configuration status
    ///
    /// Read-only; validation is recomputed on every call.
    pub fn status(&self) -> Result<ConfigStatus> {
        let env_file = EnvFileInfo::inspect(self.paths.env_file())?;
        let snapshot = self.store.snapshot();
        Ok(ConfigStatus::collect(
            &snapshot,
            env_file,
            &self.paths.env_example_file(),
            self.last_reload_time(),
        ))
    }

    /// Status for display layers; failures carry only the error message
    pub fn status_response(&self) -> StatusResponse {
        let result = self.status();
        if let Err(e) = &result {
            error!(error = %e, "Failed to collect configuration status");
        }
        result.into()
    }

    /// Validate a single key/value pair with the rule for that key
    pub fn validate_key(&self, key: &str, value: &str) -> Validation {
        validation::validate(key, value)
    }
}
