//! User-agent parsing for click analytics.

use woothee::parser::Parser;

use crate::domain::entities::UserAgentSummary;

const UNKNOWN: &str = "unknown";

/// Reduces a raw `User-Agent` header to browser, device and device class.
///
/// Unrecognised or empty headers yield `"unknown"` for every field.
pub fn summarize_user_agent(raw: &str) -> UserAgentSummary {
    let parser = Parser::new();
    let result = parser.parse(raw).unwrap_or_default();

    let browser = known_or_unknown(result.name);
    let device = known_or_unknown(result.os);
    let device_class = device_class(result.category, result.os);

    UserAgentSummary::new(browser, device, device_class)
}

fn known_or_unknown(value: &str) -> &str {
    if value.is_empty() || value == "UNKNOWN" {
        UNKNOWN
    } else {
        value
    }
}

fn device_class(category: &str, os: &str) -> &'static str {
    match category {
        "crawler" => "bot",
        "pc" => "desktop",
        "smartphone" if os == "iPad" => "tablet",
        "smartphone" | "mobilephone" => "mobile",
        "appliance" => "appliance",
        _ => UNKNOWN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_chrome() {
        let ua = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                  (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        let summary = summarize_user_agent(ua);

        assert_eq!(summary.browser, "Chrome");
        assert_eq!(summary.device_class, "desktop");
    }

    #[test]
    fn test_iphone_is_mobile() {
        let ua = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X) AppleWebKit/605.1.15 \
                  (KHTML, like Gecko) Version/17.0 Mobile/15E148 Safari/604.1";
        let summary = summarize_user_agent(ua);

        assert_eq!(summary.device, "iPhone");
        assert_eq!(summary.device_class, "mobile");
    }

    #[test]
    fn test_crawler_is_bot() {
        let ua = "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)";
        let summary = summarize_user_agent(ua);

        assert_eq!(summary.device_class, "bot");
    }

    #[test]
    fn test_empty_header() {
        let summary = summarize_user_agent("");

        assert_eq!(summary.browser, "unknown");
        assert_eq!(summary.device, "unknown");
        assert_eq!(summary.device_class, "unknown");
    }
}
