use chrono::{DateTime, TimeDelta, Utc};

use crate::bounty::Bounty;

/// Trailing window a posting must fall within to be considered.
pub const DEFAULT_WINDOW: TimeDelta = TimeDelta::hours(24);

/// Keeps bounties posted strictly after `now - window`, preserving input order.
///
/// A window reaching past the earliest representable time keeps everything.
pub fn filter_recent(bounties: Vec<Bounty>, window: TimeDelta, now: DateTime<Utc>) -> Vec<Bounty> {
    let Some(cutoff) = now.checked_sub_signed(window) else {
        return bounties;
    };
    bounties
        .into_iter()
        .filter(|bounty| bounty.created_at > cutoff)
        .collect()
}
