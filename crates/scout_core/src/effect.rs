use crate::{Bounty, Outcome};

/// IO requested by [`crate::update`]; executed by the orchestrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchListings,
    LoadSeen,
    Notify(Bounty),
    RecordSeen { link: String },
    Finish(Outcome),
}
