use std::collections::HashSet;

use crate::bounty::Bounty;

/// Picks the highest-value bounty whose link is not in `seen`.
///
/// Among equal values the earliest candidate wins.
pub fn select(candidates: Vec<Bounty>, seen: &HashSet<String>) -> Option<Bounty> {
    candidates
        .into_iter()
        .filter(|bounty| !seen.contains(&bounty.link))
        .fold(None, |best: Option<Bounty>, bounty| match best {
            Some(current) if bounty.value <= current.value => Some(current),
            _ => Some(bounty),
        })
}
