use scout_logging::{scout_debug, scout_info, scout_warn};

use crate::normalize::{normalize_batch, successful, NormalizeContext};
use crate::recency::filter_recent;
use crate::select::select;
use crate::{CycleState, Effect, Msg, Outcome, RecordPolicy, Stage};

/// Pure update function: applies a message to the cycle and returns any effects.
///
/// Messages that do not belong to the current stage are ignored.
pub fn update(mut state: CycleState, msg: Msg) -> (CycleState, Vec<Effect>) {
    let effects = match (state.stage(), msg) {
        (Stage::Idle, Msg::Start) => {
            state.set_stage(Stage::Fetching);
            vec![Effect::FetchListings]
        }
        (Stage::Fetching, Msg::ListingsFetched { result, fetched_at }) => {
            let records = match result {
                Ok(records) => records,
                Err(reason) => {
                    scout_warn!("No bounties fetched: {}", reason);
                    return finish(state, Outcome::NoBountiesFound);
                }
            };
            if records.is_empty() {
                scout_warn!("Source returned no listings");
                return finish(state, Outcome::NoBountiesFound);
            }

            let ctx = NormalizeContext::new(state.settings().site_origin.clone(), fetched_at);
            let bounties = successful(normalize_batch(&records, &ctx));
            if bounties.is_empty() {
                return finish(state, Outcome::NoNewBounties);
            }

            let recent = filter_recent(bounties, state.settings().window, fetched_at);
            scout_info!("{} bounties within the recency window", recent.len());
            if recent.is_empty() {
                return finish(state, Outcome::NoNewBounties);
            }

            state.set_candidates(recent);
            state.set_stage(Stage::Selecting);
            vec![Effect::LoadSeen]
        }
        (Stage::Selecting, Msg::SeenLoaded(seen)) => {
            let candidates = state.take_candidates();
            match select(candidates, &seen) {
                Some(winner) => {
                    scout_info!(
                        "Selected {:?} (value {}) at {}",
                        winner.title,
                        winner.value,
                        winner.link
                    );
                    state.set_winner(winner.clone());
                    state.set_stage(Stage::Notifying);
                    vec![Effect::Notify(winner)]
                }
                None => return finish(state, Outcome::NoNewBounties),
            }
        }
        (Stage::Notifying, Msg::NotifyFinished { delivered }) => {
            state.set_delivered(delivered);
            let record = delivered || state.settings().record_policy == RecordPolicy::Always;
            let Some(winner) = state.winner().cloned() else {
                return (state, Vec::new());
            };
            if record {
                state.set_stage(Stage::Recording);
                vec![Effect::RecordSeen { link: winner.link }]
            } else {
                scout_warn!("Delivery failed; {} left unrecorded for retry", winner.link);
                return finish(
                    state,
                    Outcome::Notified {
                        bounty: winner,
                        delivered: false,
                        recorded: false,
                    },
                );
            }
        }
        (Stage::Recording, Msg::SeenRecorded) => {
            let Some(winner) = state.winner().cloned() else {
                return (state, Vec::new());
            };
            let delivered = state.delivered();
            return finish(
                state,
                Outcome::Notified {
                    bounty: winner,
                    delivered,
                    recorded: true,
                },
            );
        }
        (stage, msg) => {
            scout_debug!("Ignoring {:?} in stage {:?}", msg, stage);
            Vec::new()
        }
    };

    (state, effects)
}

fn finish(mut state: CycleState, outcome: Outcome) -> (CycleState, Vec<Effect>) {
    let effect = state.finish(outcome);
    (state, vec![effect])
}
