use serde::Serialize;

use crate::Bounty;

/// Terminal result of one cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    /// The fetch failed or returned no listings.
    NoBountiesFound,
    /// Listings were fetched, but none is well-formed, recent and unannounced.
    NoNewBounties,
    /// A winner was handed to the notification sink.
    Notified {
        bounty: Bounty,
        delivered: bool,
        recorded: bool,
    },
}

impl Outcome {
    pub fn message(&self) -> &'static str {
        match self {
            Outcome::NoBountiesFound => "No bounties found.",
            Outcome::NoNewBounties => "No new bounties found.",
            Outcome::Notified {
                delivered: true, ..
            } => "Sent top bounty to Slack.",
            Outcome::Notified {
                delivered: false, ..
            } => "Top bounty selected but delivery failed.",
        }
    }

    pub fn bounty(&self) -> Option<&Bounty> {
        match self {
            Outcome::Notified { bounty, .. } => Some(bounty),
            _ => None,
        }
    }
}
