use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// Description used when a provider supplies none
pub const DEFAULT_DESCRIPTION: &str = "Click to read the full article";

/// Link value for articles that have nowhere to go (synthetic data)
pub const NO_LINK: &str = "#";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub description: String,
    pub url: String,
    pub image_url: String,
    pub published_at: String,
    pub source_name: String,
}

impl Article {
    pub fn new(title: String, source_name: String) -> Self {
        Self {
            title,
            description: DEFAULT_DESCRIPTION.to_string(),
            url: NO_LINK.to_string(),
            image_url: String::new(),
            published_at: String::new(),
            source_name,
        }
    }

    pub fn with_description(mut self, description: Option<String>) -> Self {
        self.description = description
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
        self
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| NO_LINK.to_string());
        self
    }

    pub fn with_image_url(mut self, image_url: String) -> Self {
        self.image_url = image_url;
        self
    }

    pub fn with_published_at(mut self, published_at: String) -> Self {
        self.published_at = published_at;
        self
    }

    pub fn has_link(&self) -> bool {
        self.url != NO_LINK
    }

    /// Publish time, if the provider sent something we can read
    pub fn published(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.published_at)
    }

    /// Relative age for display: "5m ago", "3h ago", "2d ago".
    /// Unreadable or future timestamps show as "just now".
    pub fn time_ago(&self, now: DateTime<Utc>) -> String {
        let Some(published) = self.published() else {
            return "just now".to_string();
        };

        let elapsed = now.signed_duration_since(published);
        let minutes = elapsed.num_minutes();

        if minutes < 1 {
            "just now".to_string()
        } else if minutes < 60 {
            format!("{}m ago", minutes)
        } else if elapsed.num_hours() < 24 {
            format!("{}h ago", elapsed.num_hours())
        } else {
            format!("{}d ago", elapsed.num_days())
        }
    }
}

/// Parse the timestamp shapes providers send: RFC 3339, RFC 2822 and the
/// bare `YYYY-MM-DD HH:MM:SS` used by the feed converter (taken as UTC).
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }

    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
