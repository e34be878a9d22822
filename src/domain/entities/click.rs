//! Click entity representing a single redirect event.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Coarse client description derived from the `User-Agent` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAgentSummary {
    pub browser: String,
    pub device: String,
    pub device_class: String,
}

impl UserAgentSummary {
    pub fn new(
        browser: impl Into<String>,
        device: impl Into<String>,
        device_class: impl Into<String>,
    ) -> Self {
        Self {
            browser: browser.into(),
            device: device.into(),
            device_class: device_class.into(),
        }
    }
}

/// A recorded visit to a short link.
///
/// Clicks are append-only; once handed to the store they are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Click {
    pub code: String,
    pub ip: String,
    #[serde(flatten)]
    pub user_agent: UserAgentSummary,
    pub clicked_at: DateTime<Utc>,
}

impl Click {
    /// Creates a new Click instance.
    pub fn new(
        code: String,
        ip: String,
        user_agent: UserAgentSummary,
        clicked_at: DateTime<Utc>,
    ) -> Self {
        Self {
            code,
            ip,
            user_agent,
            clicked_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_click_creation() {
        let now = Utc::now();
        let click = Click::new(
            "abc123".to_string(),
            "192.168.1.1".to_string(),
            UserAgentSummary::new("Chrome", "Linux", "pc"),
            now,
        );

        assert_eq!(click.code, "abc123");
        assert_eq!(click.ip, "192.168.1.1");
        assert_eq!(click.user_agent.browser, "Chrome");
        assert_eq!(click.clicked_at, now);
    }

    #[test]
    fn test_click_serializes_flat_user_agent() {
        let click = Click::new(
            "abc123".to_string(),
            "10.0.0.1".to_string(),
            UserAgentSummary::new("Safari", "iPhone", "smartphone"),
            Utc::now(),
        );

        let value = serde_json::to_value(&click).unwrap();
        assert_eq!(value["browser"], "Safari");
        assert_eq!(value["device"], "iPhone");
        assert_eq!(value["deviceClass"], "smartphone");
    }
}
