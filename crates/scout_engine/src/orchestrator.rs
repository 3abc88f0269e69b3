use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use scout_core::{update, CycleSettings, CycleState, Effect, Msg, Outcome, Stage};
use scout_logging::{scout_error, scout_info, scout_warn};

use crate::{NotificationSink, PersistError, SeenStore, SourceProvider};

/// Source of "now"; injectable so cycles can be replayed at a fixed time.
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum CycleError {
    #[error("failed to record announced bounty: {0}")]
    Persist(#[from] PersistError),
    #[error("cycle stopped in stage {stage:?} without an outcome")]
    Stalled { stage: Stage },
}

enum Step {
    Continue(Msg),
    Finished(Outcome),
}

/// Runs one fetch → select → notify → record pass per call.
///
/// Calls must not overlap; the seen store read and write are not transactional.
pub struct Orchestrator {
    source: Box<dyn SourceProvider>,
    sink: Box<dyn NotificationSink>,
    store: Box<dyn SeenStore>,
    settings: CycleSettings,
    clock: Clock,
}

impl Orchestrator {
    pub fn new(
        source: Box<dyn SourceProvider>,
        sink: Box<dyn NotificationSink>,
        store: Box<dyn SeenStore>,
        settings: CycleSettings,
    ) -> Self {
        Self {
            source,
            sink,
            store,
            settings,
            clock: Arc::new(Utc::now),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub async fn run_cycle(&self) -> Result<Outcome, CycleError> {
        let mut state = CycleState::new(self.settings.clone());
        let mut inbox = VecDeque::from([Msg::Start]);

        while let Some(msg) = inbox.pop_front() {
            let (next, effects) = update(state, msg);
            state = next;
            for effect in effects {
                match self.execute(effect).await? {
                    Step::Continue(msg) => inbox.push_back(msg),
                    Step::Finished(outcome) => {
                        scout_info!("Cycle finished: {}", outcome.message());
                        return Ok(outcome);
                    }
                }
            }
        }

        Err(CycleError::Stalled {
            stage: state.stage(),
        })
    }

    async fn execute(&self, effect: Effect) -> Result<Step, CycleError> {
        let msg = match effect {
            Effect::FetchListings => {
                let result = self
                    .source
                    .fetch_listings()
                    .await
                    .map_err(|err| err.to_string());
                Msg::ListingsFetched {
                    result,
                    fetched_at: (self.clock)(),
                }
            }
            Effect::LoadSeen => {
                let seen = self.store.read_all().unwrap_or_else(|err| {
                    scout_warn!("Could not read seen store, treating as empty: {}", err);
                    HashSet::new()
                });
                Msg::SeenLoaded(seen)
            }
            Effect::Notify(bounty) => {
                let delivered = match self.sink.deliver(&bounty).await {
                    Ok(()) => true,
                    Err(err) => {
                        scout_error!("Notification for {} failed: {}", bounty.link, err);
                        false
                    }
                };
                Msg::NotifyFinished { delivered }
            }
            Effect::RecordSeen { link } => {
                self.store.record(&link)?;
                Msg::SeenRecorded
            }
            Effect::Finish(outcome) => return Ok(Step::Finished(outcome)),
        };
        Ok(Step::Continue(msg))
    }
}
