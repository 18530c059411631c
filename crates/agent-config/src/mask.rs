//! Display masking for sensitive values

use crate::keys::is_sensitive;

/// Mask `value` for display when `key` is sensitive
///
/// Values of up to 8 characters are fully replaced; longer values keep their
/// first and last 4 characters. Non-sensitive keys are returned unchanged.
pub fn mask_value(key: &str, value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }
    if !is_sensitive(key) {
        return value.to_string();
    }

    let chars: Vec<char> = value.chars().collect();
    let len = chars.len();
    if len <= 8 {
        return "*".repeat(len);
    }

    let mut masked = String::with_capacity(value.len());
    masked.extend(&chars[..4]);
    masked.push_str(&"*".repeat(len - 8));
    masked.extend(&chars[len - 4..]);
    masked
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_sensitive_value_fully_masked() {
        assert_eq!(mask_value("OPENAI_API_KEY", "abc"), "***");
        assert_eq!(mask_value("OPENAI_API_KEY", "12345678"), "********");
    }

    #[test]
    fn test_long_sensitive_value_keeps_edges() {
        assert_eq!(mask_value("FINNHUB_API_KEY", "123456789"), "1234*6789");
        let masked = mask_value("TRADINGAGENTS_MONGODB_URL", "mongodb://localhost:27017");
        assert_eq!(masked, "mong*****************7017");
        assert_eq!(masked.chars().count(), 25);
    }

    #[test]
    fn test_empty_value() {
        assert_eq!(mask_value("OPENAI_API_KEY", ""), "");
    }

    #[test]
    fn test_non_sensitive_value_unchanged() {
        assert_eq!(mask_value("TRADINGAGENTS_CACHE_TYPE", "redis"), "redis");
    }

    #[test]
    fn test_multibyte_characters() {
        assert_eq!(mask_value("TUSHARE_TOKEN", "密钥密钥密钥密钥密钥"), "密钥密钥**密钥密钥");
    }
}
