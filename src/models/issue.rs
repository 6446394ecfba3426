use chrono::{DateTime, SecondsFormat, Utc};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct Issue {
    #[serde(rename = "number")]
    pub id: u64,
    pub title: String,
    #[serde(rename = "html_url")]
    pub url: String,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn is_closed(&self) -> bool {
        self.closed_at.is_some()
    }

    /// RFC 3339 rendering of `closed_at`, e.g. `2024-03-01T10:00:00Z`.
    pub fn closed_at_display(&self) -> Option<String> {
        self.closed_at
            .map(|ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}
