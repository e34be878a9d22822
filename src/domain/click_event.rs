//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

use crate::domain::entities::Click;
use crate::utils::user_agent::summarize_user_agent;

/// An in-memory representation of a redirect, queued for the background worker.
///
/// Carries the raw `User-Agent` header; parsing is deferred to the worker so
/// the redirect path does no work beyond building this struct.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub code: String,
    pub ip: String,
    pub user_agent: Option<String>,
    pub clicked_at: DateTime<Utc>,
}

impl ClickEvent {
    /// Creates a new click event stamped with the current time.
    pub fn new(code: String, ip: String, user_agent: Option<&str>) -> Self {
        Self {
            code,
            ip,
            user_agent: user_agent.map(|s| s.to_string()),
            clicked_at: Utc::now(),
        }
    }

    /// Converts the event into the persisted [`Click`], parsing the user agent.
    pub fn into_click(self) -> Click {
        let summary = summarize_user_agent(self.user_agent.as_deref().unwrap_or_default());
        Click::new(self.code, self.ip, summary, self.clicked_at)
    }
}
