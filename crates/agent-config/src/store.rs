//! Configuration store
//!
//! [`ConfigStore`] is the single owner of the application's environment
//! configuration. It is created at start-up, shared by `Arc`, and replaces
//! ad-hoc reads and writes of the process environment. Every write installs a
//! new immutable [`EnvSnapshot`], so readers holding an older snapshot keep a
//! consistent view.

use crate::error::{ConfigError, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// Immutable view of the configuration at a point in time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: HashMap<String, String>,
    taken_at: DateTime<Utc>,
}

impl EnvSnapshot {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self {
            vars,
            taken_at: Utc::now(),
        }
    }

    pub fn empty() -> Self {
        Self::new(HashMap::new())
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value of `key`, or `default` when absent
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Value of `key`, or the empty string when absent
    pub fn value(&self, key: &str) -> &str {
        self.get_or(key, "")
    }

    /// Whether `key` holds a non-empty value
    pub fn is_set(&self, key: &str) -> bool {
        !self.value(key).is_empty()
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// When this snapshot was produced
    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    /// New snapshot with `entries` applied on top, later entries winning
    pub fn with_entries<I, K, V>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut vars = self.vars.clone();
        vars.extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        Self::new(vars)
    }
}

impl Default for EnvSnapshot {
    fn default() -> Self {
        Self::empty()
    }
}

/// Shared, reloadable configuration store
#[derive(Debug)]
pub struct ConfigStore {
    current: RwLock<Arc<EnvSnapshot>>,
}

impl ConfigStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::with_snapshot(EnvSnapshot::empty())
    }

    pub fn with_snapshot(snapshot: EnvSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// Seed the store from the host process environment
    ///
    /// Variables whose name or value is not valid Unicode are ignored.
    pub fn from_process_env() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self::with_snapshot(EnvSnapshot::new(vars))
    }

    /// Seed the store from explicit pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::with_snapshot(EnvSnapshot::empty().with_entries(pairs))
    }

    /// The current snapshot
    pub fn snapshot(&self) -> Arc<EnvSnapshot> {
        match self.current.read() {
            Ok(current) => Arc::clone(&current),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.snapshot().get(key).map(str::to_string)
    }

    /// Value of `key`, or `default` when absent
    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Set a single value
    pub fn set(
        &self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Arc<EnvSnapshot>> {
        self.apply([(key.into(), value.into())])
    }

    /// Apply `entries` on top of the current snapshot and install the result
    ///
    /// Concurrent writers are serialised; the last one to apply wins.
    pub fn apply<I, K, V>(&self, entries: I) -> Result<Arc<EnvSnapshot>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut current = self
            .current
            .write()
            .map_err(|e| ConfigError::Lock(e.to_string()))?;
        let next = Arc::new(current.with_entries(entries));
        *current = Arc::clone(&next);
        Ok(next)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}
