//! Plain-text and JSON rendering of reload and status results

use agent_config::{
    ChangeKind, ConfigStatus, HealthSummary, KeyGroup, Level, OverallStatus, ReloadOutcome,
    StatusResponse, Validation,
};
use comfy_table::Table;
use serde::Serialize;

/// Status report, preceded by the reload that was run first, if any
#[derive(Debug, Serialize)]
pub struct StatusDocument<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reload: Option<&'a ReloadOutcome>,
    pub status: &'a StatusResponse,
}

/// Render `document` as a single JSON value
///
/// Without a reload the bare status response is emitted.
pub fn status_json(document: &StatusDocument<'_>) -> serde_json::Result<String> {
    match document.reload {
        Some(_) => serde_json::to_string_pretty(document),
        None => serde_json::to_string_pretty(document.status),
    }
}

fn level_icon(level: Level) -> &'static str {
    match level {
        Level::Success => "✅",
        Level::Warning => "⚠️",
        Level::Error => "❌",
        Level::Info => "ℹ️",
    }
}

fn change_icon(kind: ChangeKind) -> &'static str {
    match kind {
        ChangeKind::New => "➕",
        ChangeKind::Updated => "🔄",
        ChangeKind::Removed => "➖",
    }
}

pub fn reload_outcome(outcome: &ReloadOutcome) -> String {
    let mut output = String::new();
    if outcome.success {
        output.push_str(&format!("✅ {}\n", outcome.message));
    } else {
        output.push_str(&format!("❌ Error: {}\n", outcome.message));
    }

    if let Some(stats) = &outcome.stats {
        if stats.total_changes > 0 {
            output.push_str(&format!(
                "Changes: {} new, {} updated, {} removed\n",
                stats.new_keys, stats.updated_keys, stats.removed_keys
            ));
            let mut table = Table::new();
            table.set_header(vec!["", "Key", "From", "To"]);
            for (key, change) in &stats.changes {
                table.add_row(vec![
                    change_icon(change.kind).to_string(),
                    key.clone(),
                    change.from.clone(),
                    change.to.clone(),
                ]);
            }
            output.push_str(&format!("{table}\n"));
        }
        if stats.skipped_lines > 0 {
            output.push_str(&format!("⚠️ {} malformed line(s) skipped\n", stats.skipped_lines));
        }
    }

    for propagation in &outcome.propagation {
        if let Some(error) = &propagation.error {
            output.push_str(&format!(
                "⚠️ {} was not reinitialized: {}\n",
                propagation.listener, error
            ));
        }
    }

    output
}

pub fn validation_line(key: &str, validation: &Validation) -> String {
    format!("{} {}: {}", level_icon(validation.level), key, validation.message)
}

pub fn status_response(response: &StatusResponse) -> String {
    match response {
        StatusResponse::Ok(status) => status_report(status),
        StatusResponse::Error { error } => health(&HealthSummary::failed(error)),
    }
}

fn status_report(status: &ConfigStatus) -> String {
    let mut output = String::new();

    let file = &status.env_file;
    if file.exists {
        let modified = file
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "unknown".to_string());
        output.push_str(&format!(
            "📄 {}: {} bytes, modified {}\n",
            file.path.display(),
            file.size,
            modified
        ));
    } else {
        output.push_str(&format!("❌ {} does not exist\n", file.path.display()));
    }
    if let Some(hint) = &status.setup_hint {
        output.push_str(&format!("💡 {hint}\n"));
    }
    if let Some(reloaded) = status.last_reload_time {
        output.push_str(&format!("Last reload: {}\n", reloaded.format("%Y-%m-%d %H:%M:%S")));
    }

    for group in KeyGroup::ALL {
        let counts = status.counts(group);
        output.push_str(&format!("\n{} ({}/{})\n", group, counts.configured, counts.total));

        let mut table = Table::new();
        table.set_header(vec!["Key", "Value", "Status"]);
        for key in status.group(group) {
            table.add_row(vec![
                key.key.clone(),
                key.value.clone(),
                format!("{} {}", level_icon(key.validation.level), key.validation.message),
            ]);
        }
        output.push_str(&format!("{table}\n"));
    }

    output.push('\n');
    output.push_str(&health(&status.validation_results));
    output
}

fn health(summary: &HealthSummary) -> String {
    let headline = match summary.overall_status {
        OverallStatus::Healthy => "✅ Configuration is healthy",
        OverallStatus::Warning => "⚠️ Configuration has warnings",
        OverallStatus::Critical => "❌ Configuration has critical issues",
        OverallStatus::Unknown => "❓ Configuration status unknown",
        OverallStatus::Error => "❌ Configuration could not be validated",
    };

    let mut output = format!("{headline}\n");
    for issue in &summary.critical_issues {
        output.push_str(&format!("  ❌ {issue}\n"));
    }
    for warning in &summary.warnings {
        output.push_str(&format!("  ⚠️ {warning}\n"));
    }
    for recommendation in &summary.recommendations {
        output.push_str(&format!("  💡 {recommendation}\n"));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_config::{ChangeRecord, PropagationOutcome, ReloadStats};
    use std::collections::BTreeMap;

    #[test]
    fn test_failed_reload_rendering() {
        let outcome = ReloadOutcome {
            success: false,
            message: "configuration file does not exist: /x/.env".to_string(),
            stats: None,
            propagation: Vec::new(),
        };
        assert_eq!(
            reload_outcome(&outcome),
            "❌ Error: configuration file does not exist: /x/.env\n"
        );
    }

    #[test]
    fn test_reload_rendering_lists_changes_and_failed_listeners() {
        let mut changes = BTreeMap::new();
        changes.insert(
            "TRADINGAGENTS_CACHE_TYPE".to_string(),
            ChangeRecord {
                kind: ChangeKind::Updated,
                from: "memory".to_string(),
                to: "redis".to_string(),
            },
        );
        let outcome = ReloadOutcome {
            success: true,
            message: "environment reloaded, 1 configuration change(s) detected".to_string(),
            stats: Some(ReloadStats {
                total_changes: 1,
                new_keys: 0,
                updated_keys: 1,
                removed_keys: 0,
                changes,
                reload_time: chrono::Utc::now(),
                entries_loaded: 4,
                skipped_lines: 1,
            }),
            propagation: vec![PropagationOutcome::failed("runtime-settings", "bad value")],
        };

        let text = reload_outcome(&outcome);
        assert!(text.contains("Changes: 0 new, 1 updated, 0 removed"));
        assert!(text.contains("TRADINGAGENTS_CACHE_TYPE"));
        assert!(text.contains("1 malformed line(s) skipped"));
        assert!(text.contains("runtime-settings was not reinitialized: bad value"));
    }

    #[test]
    fn test_error_status_rendering() {
        let response = StatusResponse::Error {
            error: "IO error: denied".to_string(),
        };
        let text = status_response(&response);
        assert!(text.starts_with("❌ Configuration could not be validated"));
        assert!(text.contains("validation failed: IO error: denied"));
    }

    #[test]
    fn test_status_json_carries_failed_reload() {
        let outcome = ReloadOutcome {
            success: false,
            message: "configuration file does not exist: /x/.env".to_string(),
            stats: None,
            propagation: Vec::new(),
        };
        let response = StatusResponse::Error {
            error: "Lock error: poisoned".to_string(),
        };
        let text = status_json(&StatusDocument {
            reload: Some(&outcome),
            status: &response,
        })
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["reload"]["success"], false);
        assert_eq!(value["reload"]["message"], "configuration file does not exist: /x/.env");
        assert_eq!(value["status"]["error"], "Lock error: poisoned");
    }

    #[test]
    fn test_status_json_without_reload_is_bare_response() {
        let response = StatusResponse::Error {
            error: "IO error: denied".to_string(),
        };
        let text = status_json(&StatusDocument {
            reload: None,
            status: &response,
        })
        .unwrap();

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value, serde_json::json!({ "error": "IO error: denied" }));
    }

    #[test]
    fn test_validation_line() {
        let line = validation_line("TRADINGAGENTS_LOG_LEVEL", &Validation::error("bad"));
        assert_eq!(line, "❌ TRADINGAGENTS_LOG_LEVEL: bad");
    }
}
