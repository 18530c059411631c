//! Downstream components notified after a reload

use crate::store::EnvSnapshot;
use serde::{Deserialize, Serialize};

/// An in-process component that re-derives its state from the configuration
///
/// Called synchronously after every successful reload with the snapshot that
/// was just installed. Errors are reported back to the reloader, which logs
/// them and records a failed [`PropagationOutcome`] without failing the reload.
#[cfg_attr(test, mockall::automock)]
pub trait ReloadListener: Send + Sync {
    /// Name used in logs and propagation outcomes
    fn name(&self) -> &str;

    /// Re-initialize from `snapshot`
    fn reinitialize(&self, snapshot: &EnvSnapshot) -> anyhow::Result<()>;
}

/// Result of notifying one listener
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropagationOutcome {
    pub listener: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PropagationOutcome {
    pub fn succeeded(listener: impl Into<String>) -> Self {
        Self {
            listener: listener.into(),
            success: true,
            error: None,
        }
    }

    pub fn failed(listener: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            listener: listener.into(),
            success: false,
            error: Some(error.into()),
        }
    }
}
