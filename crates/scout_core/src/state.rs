use chrono::TimeDelta;
use serde::Deserialize;

use crate::bounty::{Bounty, DEFAULT_SITE_ORIGIN};
use crate::recency::DEFAULT_WINDOW;
use crate::{Effect, Outcome};

/// Whether the winner's link is recorded after a failed delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum RecordPolicy {
    /// Record after every delivery attempt, so a winner is never announced twice.
    #[default]
    Always,
    /// Record only confirmed deliveries, so a failed winner is retried next cycle.
    OnDelivery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CycleSettings {
    pub site_origin: String,
    pub window: TimeDelta,
    pub record_policy: RecordPolicy,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            site_origin: DEFAULT_SITE_ORIGIN.to_string(),
            window: DEFAULT_WINDOW,
            record_policy: RecordPolicy::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    #[default]
    Idle,
    Fetching,
    Selecting,
    Notifying,
    Recording,
    Done,
}

/// State of a single cycle. A fresh value is used for every invocation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CycleState {
    settings: CycleSettings,
    stage: Stage,
    candidates: Vec<Bounty>,
    winner: Option<Bounty>,
    delivered: bool,
    outcome: Option<Outcome>,
}

impl CycleState {
    pub fn new(settings: CycleSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn settings(&self) -> &CycleSettings {
        &self.settings
    }

    /// Recent candidates awaiting the seen-set, in fetch order.
    pub fn candidates(&self) -> &[Bounty] {
        &self.candidates
    }

    pub fn winner(&self) -> Option<&Bounty> {
        self.winner.as_ref()
    }

    pub fn outcome(&self) -> Option<&Outcome> {
        self.outcome.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.stage == Stage::Done
    }

    pub(crate) fn set_stage(&mut self, stage: Stage) {
        self.stage = stage;
    }

    pub(crate) fn set_candidates(&mut self, candidates: Vec<Bounty>) {
        self.candidates = candidates;
    }

    pub(crate) fn take_candidates(&mut self) -> Vec<Bounty> {
        std::mem::take(&mut self.candidates)
    }

    pub(crate) fn set_winner(&mut self, winner: Bounty) {
        self.winner = Some(winner);
    }

    pub(crate) fn set_delivered(&mut self, delivered: bool) {
        self.delivered = delivered;
    }

    pub(crate) fn delivered(&self) -> bool {
        self.delivered
    }

    pub(crate) fn finish(&mut self, outcome: Outcome) -> Effect {
        self.stage = Stage::Done;
        self.outcome = Some(outcome.clone());
        Effect::Finish(outcome)
    }
}
