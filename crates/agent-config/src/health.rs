//! Aggregate configuration health
//!
//! Business-rule checks that look across keys rather than at a single value.

use crate::keys;
use crate::store::EnvSnapshot;
use crate::validation::parse_bool;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Worst-severity classification of the configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallStatus {
    Healthy,
    Warning,
    Critical,
    #[default]
    Unknown,
    Error,
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Healthy => "healthy",
            Self::Warning => "warning",
            Self::Critical => "critical",
            Self::Unknown => "unknown",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Result of the cross-key checks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub overall_status: OverallStatus,
    pub critical_issues: Vec<String>,
    pub warnings: Vec<String>,
    pub recommendations: Vec<String>,
}

impl HealthSummary {
    /// Run every check against `snapshot`
    pub fn evaluate(snapshot: &EnvSnapshot) -> Self {
        let mut summary = Self::default();

        for key in keys::CRITICAL_KEYS {
            if !snapshot.is_set(key) {
                summary
                    .critical_issues
                    .push(format!("missing required API key: {}", key));
            }
        }

        if !snapshot.is_set(keys::MONGODB_URL) && !snapshot.is_set(keys::REDIS_URL) {
            summary
                .warnings
                .push("no database configured, local storage will be used".to_string());
        }

        if parse_bool(snapshot.get_or(keys::MEMORY_ENABLED, "true")) == Some(false) {
            summary.warnings.push("memory feature is disabled".to_string());
        }

        if !snapshot.is_set(keys::TUSHARE_TOKEN) {
            summary
                .recommendations
                .push("configure TUSHARE_TOKEN for more accurate A-share data".to_string());
        }
        if !snapshot.is_set(keys::GOOGLE_API_KEY) {
            summary
                .recommendations
                .push("configure GOOGLE_API_KEY to use Google AI models".to_string());
        }

        summary.overall_status = summary.derive_status();
        summary
    }

    /// Summary for a check that could not run
    pub fn failed(reason: impl fmt::Display) -> Self {
        Self {
            overall_status: OverallStatus::Error,
            critical_issues: vec![format!("validation failed: {}", reason)],
            ..Self::default()
        }
    }

    /// Critical beats warning beats healthy
    pub fn derive_status(&self) -> OverallStatus {
        if !self.critical_issues.is_empty() {
            OverallStatus::Critical
        } else if !self.warnings.is_empty() {
            OverallStatus::Warning
        } else {
            OverallStatus::Healthy
        }
    }
}
