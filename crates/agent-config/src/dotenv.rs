//! `.env` file parser
//!
//! Line oriented `KEY=VALUE` format:
//!
//! ```text
//! # comment
//! export DASHSCOPE_API_KEY=sk-xxxxxxxx
//! TRADINGAGENTS_LOG_DIR=./logs        # trailing comment
//! GREETING="hello\nworld"
//! LITERAL='${NOT_EXPANDED}'
//! RESULTS=${TRADINGAGENTS_LOG_DIR}/results
//! CACHE=${TRADINGAGENTS_CACHE_TYPE:-memory}
//! ```
//!
//! Quoted values may span several lines. Malformed lines are skipped rather
//! than failing the whole file.

use crate::error::{ConfigError, Result};
use regex::{Captures, Regex};
use std::collections::HashMap;
use std::path::Path;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

static KEY_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_.]*$").expect("static key pattern is valid")
});

static INTERPOLATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
        .expect("static interpolation pattern is valid")
});

/// Why a line was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
enum LineError {
    #[error("missing '='")]
    MissingEquals,
    #[error("invalid key '{0}'")]
    InvalidKey(String),
    #[error("unterminated single quote")]
    UnterminatedSingle,
    #[error("unterminated double quote")]
    UnterminatedDouble,
    #[error("unexpected text after closing quote: '{0}'")]
    TrailingText(String),
}

impl LineError {
    fn is_unterminated(&self) -> bool {
        matches!(self, Self::UnterminatedSingle | Self::UnterminatedDouble)
    }
}

/// A line that could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number
    pub line: usize,
    pub reason: String,
}

/// Parsed contents of a `.env` file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DotenvFile {
    entries: Vec<(String, String)>,
    skipped: Vec<SkippedLine>,
}

impl DotenvFile {
    /// Entries in file order; later duplicates override earlier ones when applied
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<(String, String)> {
        self.entries
    }

    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Last value assigned to `key` in the file
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Read and parse `path`
///
/// `lookup` resolves `${VAR}` references that are not defined earlier in the
/// same file.
pub fn load<F>(path: &Path, lookup: F) -> Result<DotenvFile>
where
    F: Fn(&str) -> Option<String>,
{
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let parsed = parse(&content, lookup);
    for skipped in parsed.skipped() {
        warn!(
            path = %path.display(),
            line = skipped.line,
            reason = %skipped.reason,
            "Skipping malformed line in env file"
        );
    }
    Ok(parsed)
}

/// Parse `.env` content
pub fn parse<F>(content: &str, lookup: F) -> DotenvFile
where
    F: Fn(&str) -> Option<String>,
{
    let mut file = DotenvFile::default();
    let mut defined: HashMap<String, String> = HashMap::new();
    let lines: Vec<&str> = content.lines().collect();

    let mut index = 0;
    while index < lines.len() {
        let start = index;
        index += 1;

        let line = lines[start].trim_start();
        if line.trim_end().is_empty() || line.starts_with('#') {
            continue;
        }

        let resolve = |name: &str| defined.get(name).cloned().or_else(|| lookup(name));

        // An open quote pulls in following lines until it closes
        let mut logical = line.to_string();
        let mut end = index;
        let mut result = parse_line(&logical, &resolve);
        while end < lines.len() && result.as_ref().is_err_and(LineError::is_unterminated) {
            logical.push('\n');
            logical.push_str(lines[end]);
            end += 1;
            result = parse_line(&logical, &resolve);
        }

        match result {
            Ok((key, value)) => {
                index = end;
                defined.insert(key.clone(), value.clone());
                file.entries.push((key, value));
            }
            Err(reason) => file.skipped.push(SkippedLine {
                line: start + 1,
                reason: reason.to_string(),
            }),
        }
    }

    file
}

fn parse_line<F>(line: &str, resolve: &F) -> std::result::Result<(String, String), LineError>
where
    F: Fn(&str) -> Option<String>,
{
    let line = strip_export(line);
    let (key, rest) = line.split_once('=').ok_or(LineError::MissingEquals)?;

    let key = key.trim();
    if !KEY_PATTERN.is_match(key) {
        return Err(LineError::InvalidKey(key.to_string()));
    }

    let rest = rest.trim_start();
    let value = if let Some(quoted) = rest.strip_prefix('\'') {
        let end = quoted.find('\'').ok_or(LineError::UnterminatedSingle)?;
        ensure_comment_only(&quoted[end + 1..])?;
        quoted[..end].to_string()
    } else if let Some(quoted) = rest.strip_prefix('"') {
        let (value, remainder) = unescape_double_quoted(quoted)?;
        ensure_comment_only(remainder)?;
        interpolate(&value, resolve)
    } else {
        interpolate(strip_inline_comment(rest).trim_end(), resolve)
    };

    Ok((key.to_string(), value))
}

/// Only whitespace or a comment may follow a closing quote
fn ensure_comment_only(remainder: &str) -> std::result::Result<(), LineError> {
    let remainder = remainder.trim();
    if remainder.is_empty() || remainder.starts_with('#') {
        Ok(())
    } else {
        Err(LineError::TrailingText(remainder.to_string()))
    }
}

fn strip_export(line: &str) -> &str {
    match line.strip_prefix("export") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => line,
    }
}

/// Cut an unquoted value at the first `#` preceded by whitespace
fn strip_inline_comment(value: &str) -> &str {
    let mut previous_is_space = false;
    for (idx, ch) in value.char_indices() {
        if ch == '#' && previous_is_space {
            return &value[..idx];
        }
        previous_is_space = ch.is_whitespace();
    }
    value
}

/// Decode a double-quoted value, returning it and the text after the closing quote
fn unescape_double_quoted(input: &str) -> std::result::Result<(String, &str), LineError> {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.char_indices();
    while let Some((idx, ch)) = chars.next() {
        match ch {
            '"' => return Ok((out, &input[idx + 1..])),
            '\\' => match chars.next().map(|(_, escaped)| escaped) {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some('"') => out.push('"'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => break,
            },
            other => out.push(other),
        }
    }
    Err(LineError::UnterminatedDouble)
}

fn interpolate<F>(value: &str, resolve: &F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    INTERPOLATION
        .replace_all(value, |caps: &Captures<'_>| {
            resolve(&caps[1])
                .filter(|resolved| !resolved.is_empty())
                .or_else(|| caps.get(2).map(|default| default.as_str().to_string()))
                .unwrap_or_default()
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn no_lookup(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_basic_pairs_and_comments() {
        let parsed = parse(
            "# header\n\nDASHSCOPE_API_KEY=sk-abc\n  FINNHUB_API_KEY = fh123  \n",
            no_lookup,
        );
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("DASHSCOPE_API_KEY"), Some("sk-abc"));
        assert_eq!(parsed.get("FINNHUB_API_KEY"), Some("fh123"));
        assert!(parsed.skipped().is_empty());
    }

    #[test]
    fn test_export_prefix() {
        let parsed = parse("export MEMORY_ENABLED=true\nexporter=1\n", no_lookup);
        assert_eq!(parsed.get("MEMORY_ENABLED"), Some("true"));
        assert_eq!(parsed.get("exporter"), Some("1"));
    }

    #[test]
    fn test_inline_comment_only_after_whitespace() {
        let parsed = parse("A=value # note\nB=abc#def\n", no_lookup);
        assert_eq!(parsed.get("A"), Some("value"));
        assert_eq!(parsed.get("B"), Some("abc#def"));
    }

    #[test]
    fn test_quoted_values() {
        let parsed = parse(
            "A='single ${X} # kept'\nB=\"line\\nbreak \\\"q\\\"\" # comment\nC=\"\"\n",
            |_| Some("x".to_string()),
        );
        assert_eq!(parsed.get("A"), Some("single ${X} # kept"));
        assert_eq!(parsed.get("B"), Some("line\nbreak \"q\""));
        assert_eq!(parsed.get("C"), Some(""));
    }

    #[test]
    fn test_interpolation_prefers_file_then_lookup() {
        let parsed = parse(
            concat!(
                "BASE=/data\nLOG=${BASE}/logs\nHOME_DIR=${HOME}\n",
                "MISSING=${NOPE}\nDEF=${NOPE:-memory}\n",
            ),
            |name| (name == "HOME").then(|| "/home/agent".to_string()),
        );
        assert_eq!(parsed.get("LOG"), Some("/data/logs"));
        assert_eq!(parsed.get("HOME_DIR"), Some("/home/agent"));
        assert_eq!(parsed.get("MISSING"), Some(""));
        assert_eq!(parsed.get("DEF"), Some("memory"));
    }

    #[test]
    fn test_malformed_lines_are_skipped() {
        let parsed = parse("JUST_A_WORD\n1BAD=x\nQ='open\nGOOD=1\n", no_lookup);
        assert_eq!(parsed.len(), 1);
        let lines: Vec<usize> = parsed.skipped().iter().map(|s| s.line).collect();
        assert_eq!(lines, vec![1, 2, 3]);
        assert_eq!(parsed.skipped()[0].reason, "missing '='");
    }

    #[test]
    fn test_text_after_closing_quote_is_skipped() {
        let parsed = parse(
            "A=\"x\" junk\nB='y' more\nC=\"z\"   # fine\nD='w'#fine\n",
            no_lookup,
        );
        assert_eq!(parsed.get("A"), None);
        assert_eq!(parsed.get("B"), None);
        assert_eq!(parsed.get("C"), Some("z"));
        assert_eq!(parsed.get("D"), Some("w"));
        assert_eq!(parsed.skipped().len(), 2);
        assert_eq!(parsed.skipped()[0].reason, "unexpected text after closing quote: 'junk'");
        assert_eq!(parsed.skipped()[1].line, 2);
    }

    #[test]
    fn test_multiline_quoted_values() {
        let parsed = parse(
            "CERT=\"-----BEGIN-----\nabc\n-----END-----\"\nNOTE='two\n  lines'\nNEXT=1\n",
            no_lookup,
        );
        assert_eq!(parsed.get("CERT"), Some("-----BEGIN-----\nabc\n-----END-----"));
        assert_eq!(parsed.get("NOTE"), Some("two\n  lines"));
        assert_eq!(parsed.get("NEXT"), Some("1"));
        assert!(parsed.skipped().is_empty());
    }

    #[test]
    fn test_unclosed_quote_does_not_swallow_following_lines() {
        let parsed = parse("OPEN=\"never closed\nAFTER=1\nLAST=2\n", no_lookup);
        assert_eq!(parsed.get("AFTER"), Some("1"));
        assert_eq!(parsed.get("LAST"), Some("2"));
        assert_eq!(parsed.skipped().len(), 1);
        assert_eq!(parsed.skipped()[0].line, 1);
        assert_eq!(parsed.skipped()[0].reason, "unterminated double quote");
    }

    #[test]
    fn test_duplicate_keys_last_wins() {
        let parsed = parse("A=1\nA=2\n", no_lookup);
        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.get("A"), Some("2"));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".env");
        fs::write(&path, "TUSHARE_TOKEN=abcdefghijk\n").unwrap();

        let parsed = load(&path, no_lookup).unwrap();
        assert_eq!(parsed.get("TUSHARE_TOKEN"), Some("abcdefghijk"));
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempdir().unwrap();
        let err = load(&dir.path().join(".env"), no_lookup).unwrap_err();
        assert!(matches!(err, ConfigError::LoadFailed { .. }));
    }
}
