use chrono::{DateTime, Utc};
use serde::Serialize;

/// Origin prefixed to site-relative links.
pub const DEFAULT_SITE_ORIGIN: &str = "https://replit.com";

/// Title used when a listing carries none.
pub const UNKNOWN_TITLE: &str = "Unknown";

/// A normalized listing. `link` is its identity for deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bounty {
    pub title: String,
    pub value: u64,
    pub link: String,
    pub created_at: DateTime<Utc>,
}

impl Bounty {
    pub fn new(
        title: impl Into<String>,
        value: u64,
        link: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            value,
            link: link.into(),
            created_at,
        }
    }
}
