//! Scout core: pure bounty pipeline and the per-cycle state machine.
mod bounty;
mod effect;
mod msg;
mod normalize;
mod outcome;
mod recency;
mod select;
mod state;
mod update;

pub use bounty::{Bounty, DEFAULT_SITE_ORIGIN, UNKNOWN_TITLE};
pub use effect::Effect;
pub use msg::Msg;
pub use normalize::{
    normalize_batch, normalize_record, parse_reward, parse_timestamp, successful,
    NormalizeContext, RecordError,
};
pub use outcome::Outcome;
pub use recency::{filter_recent, DEFAULT_WINDOW};
pub use select::select;
pub use state::{CycleSettings, CycleState, RecordPolicy, Stage};
pub use update::update;
