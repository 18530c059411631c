//! Tracked configuration keys
//!
//! The reloader only diffs and validates a fixed set of keys, split into three
//! disjoint groups. Everything else in the `.env` file is loaded into the store
//! but never reported on.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const DASHSCOPE_API_KEY: &str = "DASHSCOPE_API_KEY";
pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
pub const DEEPSEEK_API_KEY: &str = "DEEPSEEK_API_KEY";
pub const VOLCENGINE_API_KEY: &str = "VOLCENGINE_API_KEY";
pub const CUSTOM_OPENAI_API_KEY: &str = "CUSTOM_OPENAI_API_KEY";
pub const OPENROUTER_API_KEY: &str = "OPENROUTER_API_KEY";
pub const FINNHUB_API_KEY: &str = "FINNHUB_API_KEY";
pub const TUSHARE_TOKEN: &str = "TUSHARE_TOKEN";

pub const MONGODB_URL: &str = "TRADINGAGENTS_MONGODB_URL";
pub const REDIS_URL: &str = "TRADINGAGENTS_REDIS_URL";
pub const CACHE_TYPE: &str = "TRADINGAGENTS_CACHE_TYPE";

pub const MEMORY_ENABLED: &str = "MEMORY_ENABLED";
pub const LOG_LEVEL: &str = "TRADINGAGENTS_LOG_LEVEL";
pub const LOG_DIR: &str = "TRADINGAGENTS_LOG_DIR";
pub const RESULTS_DIR: &str = "TRADINGAGENTS_RESULTS_DIR";

/// LLM and market-data credentials
pub const API_KEYS: &[&str] = &[
    DASHSCOPE_API_KEY,
    OPENAI_API_KEY,
    GOOGLE_API_KEY,
    DEEPSEEK_API_KEY,
    VOLCENGINE_API_KEY,
    CUSTOM_OPENAI_API_KEY,
    OPENROUTER_API_KEY,
    FINNHUB_API_KEY,
    TUSHARE_TOKEN,
];

/// Storage backend settings
pub const DATABASE_KEYS: &[&str] = &[MONGODB_URL, REDIS_URL, CACHE_TYPE];

/// Runtime settings
pub const SYSTEM_KEYS: &[&str] = &[MEMORY_ENABLED, LOG_LEVEL, LOG_DIR, RESULTS_DIR];

/// Keys required for baseline operation
pub const CRITICAL_KEYS: &[&str] = &[DASHSCOPE_API_KEY, FINNHUB_API_KEY];

/// Substrings that mark a key as sensitive
const SENSITIVE_PATTERNS: &[&str] = &[
    "API_KEY",
    "TOKEN",
    "PASSWORD",
    "SECRET",
    "PRIVATE",
    "MONGODB_URL",
    "REDIS_URL",
];

/// Group a tracked key belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyGroup {
    ApiKeys,
    Database,
    System,
}

impl KeyGroup {
    pub const ALL: [KeyGroup; 3] = [Self::ApiKeys, Self::Database, Self::System];

    /// Keys in this group, in display order
    pub fn keys(self) -> &'static [&'static str] {
        match self {
            Self::ApiKeys => API_KEYS,
            Self::Database => DATABASE_KEYS,
            Self::System => SYSTEM_KEYS,
        }
    }

    /// Group of `key`, or `None` for untracked keys
    pub fn of(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|group| group.keys().iter().any(|k| *k == key))
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::ApiKeys => "API keys",
            Self::Database => "Database",
            Self::System => "System",
        }
    }
}

impl fmt::Display for KeyGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Every tracked key across all groups
pub fn tracked_keys() -> impl Iterator<Item = &'static str> {
    KeyGroup::ALL.into_iter().flat_map(|group| group.keys().iter().copied())
}

/// Whether values of `key` must be masked before display
pub fn is_sensitive(key: &str) -> bool {
    let upper = key.to_ascii_uppercase();
    SENSITIVE_PATTERNS.iter().any(|pattern| upper.contains(pattern))
}
