//! Short link entity.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// A short code mapped to its original URL, with ownership and click metadata.
///
/// `code` is unique across all records and never changes once assigned.
/// `click_count` only grows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLink {
    pub code: String,
    pub owner_id: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    pub click_count: i64,
    pub disabled: bool,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        code: String,
        owner_id: String,
        original_url: String,
        created_at: DateTime<Utc>,
        click_count: i64,
        disabled: bool,
    ) -> Self {
        Self {
            code,
            owner_id,
            original_url,
            created_at,
            click_count,
            disabled,
        }
    }

    /// Returns true if the link belongs to `owner_id` and points at `url`.
    pub fn is_same_target(&self, owner_id: &str, url: &str) -> bool {
        self.owner_id == owner_id && self.original_url == url
    }
}

/// Input data for creating a new short link.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub code: String,
    pub owner_id: String,
    pub original_url: String,
    pub is_guest: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_link_creation() {
        let now = Utc::now();
        let link = ShortLink::new(
            "a1b2c3".to_string(),
            "1.2.3.4".to_string(),
            "https://example.com/a".to_string(),
            now,
            0,
            false,
        );

        assert_eq!(link.code, "a1b2c3");
        assert_eq!(link.owner_id, "1.2.3.4");
        assert_eq!(link.created_at, now);
        assert_eq!(link.click_count, 0);
        assert!(!link.disabled);
    }

    #[test]
    fn test_is_same_target() {
        let link = ShortLink::new(
            "a1b2c3".to_string(),
            "user@example.com".to_string(),
            "https://example.com/a".to_string(),
            Utc::now(),
            3,
            false,
        );

        assert!(link.is_same_target("user@example.com", "https://example.com/a"));
        assert!(!link.is_same_target("other@example.com", "https://example.com/a"));
        assert!(!link.is_same_target("user@example.com", "https://example.com/b"));
    }

    #[test]
    fn test_serializes_camel_case() {
        let link = ShortLink::new(
            "abc".to_string(),
            "o".to_string(),
            "https://example.com".to_string(),
            Utc::now(),
            1,
            true,
        );

        let value = serde_json::to_value(&link).unwrap();
        assert_eq!(value["originalUrl"], "https://example.com");
        assert_eq!(value["clickCount"], 1);
        assert_eq!(value["disabled"], true);
    }
}
