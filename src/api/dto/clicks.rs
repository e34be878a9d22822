//! DTOs for click history.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::Click;

/// Individual click event information.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClickInfo {
    pub clicked_at: DateTime<Utc>,
    pub ip: String,
    pub browser: String,
    pub device: String,
    pub device_type: String,
}

impl From<Click> for ClickInfo {
    fn from(click: Click) -> Self {
        Self {
            clicked_at: click.clicked_at,
            ip: click.ip,
            browser: click.user_agent.browser,
            device: click.user_agent.device,
            device_type: click.user_agent.device_class,
        }
    }
}

/// Response for `GET /api/url/{code}/clicks`.
#[derive(Debug, Serialize)]
pub struct ClickHistoryResponse {
    pub code: String,
    pub total: usize,
    pub items: Vec<ClickInfo>,
}
