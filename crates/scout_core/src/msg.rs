use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// Begin a cycle.
    Start,
    /// Source returned; `Err` carries a printable reason.
    ListingsFetched {
        result: Result<Vec<Value>, String>,
        fetched_at: DateTime<Utc>,
    },
    /// Previously announced links (empty when the store could not be read).
    SeenLoaded(HashSet<String>),
    /// Delivery attempt for the winner finished.
    NotifyFinished { delivered: bool },
    /// Winner's link was durably appended to the seen store.
    SeenRecorded,
}
