use std::collections::HashMap;

use serde::Serialize;
use thiserror::Error;

use crate::allocator::{GreenAllocation, GreenTimeAllocator};
use crate::config::SchedulerConfig;
use crate::domain::{CountSnapshot, Direction};
use crate::estimator::{FlowRateEstimator, FlowRates};
use crate::history::FlowHistory;
use crate::phase_machine::{CycleSequence, MirroredTurnSequencer, PhaseSequencer};
use crate::safety::{check_allocation, verify_cycle, SafetyViolation};
use crate::validation::{validate_counts, ValidationError};

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid count input: {0}")]
    Invalid(#[from] ValidationError),
    #[error("safety check failed: {0}")]
    Safety(#[from] SafetyViolation),
    #[error("scheduler lock poisoned")]
    Poisoned,
    #[error("count sink failed: {0}")]
    Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Result of one scheduling tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchedulePlan {
    /// Whether the counts were taken into the history on this tick.
    pub accepted: bool,
    pub counts: CountSnapshot,
    pub flow_rates: FlowRates,
    pub allocation: GreenAllocation,
    pub cycle: CycleSequence,
}

impl SchedulePlan {
    pub fn into_parts(self) -> (GreenAllocation, CycleSequence) {
        (self.allocation, self.cycle)
    }
}

/// Adaptive signal scheduler for one intersection.
///
/// Owns the count history; everything else is recomputed on every tick.
#[derive(Debug, Clone)]
pub struct Scheduler<S: PhaseSequencer = MirroredTurnSequencer> {
    pub cfg: SchedulerConfig,
    history: FlowHistory,
    estimator: FlowRateEstimator,
    allocator: GreenTimeAllocator,
    sequencer: S,
}

impl Scheduler<MirroredTurnSequencer> {
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self::with_sequencer(cfg, MirroredTurnSequencer)
    }
}

impl Default for Scheduler<MirroredTurnSequencer> {
    fn default() -> Self {
        Self::new(SchedulerConfig::default())
    }
}

impl<S: PhaseSequencer> Scheduler<S> {
    pub fn with_sequencer(cfg: SchedulerConfig, sequencer: S) -> Self {
        Self {
            history: FlowHistory::new(cfg.sample_interval_us),
            estimator: FlowRateEstimator,
            allocator: GreenTimeAllocator::new(cfg.bounds),
            sequencer,
            cfg,
        }
    }

    /// Update history (if the sample gate is open), then estimate, allocate and sequence.
    ///
    /// The history is only committed once every check has passed; a failed
    /// tick leaves it exactly as it was.
    pub fn tick(&mut self, counts: &CountSnapshot, now_us: i64) -> Result<SchedulePlan, SchedulerError> {
        let mut next = self.history.clone();
        let accepted = next.update(counts, now_us);
        let flow_rates = self.estimator.estimate(&next);
        let allocation = self.allocator.allocate(&flow_rates, counts);
        check_allocation(&allocation, &self.cfg.bounds)?;
        let cycle = self.sequencer.build(&allocation);
        verify_cycle(&cycle)?;
        self.history = next;
        if accepted {
            log::debug!(
                "accepted sample {:?} at {}us, cycle {:.1}s",
                counts,
                now_us,
                cycle.total_duration_s()
            );
        }
        Ok(SchedulePlan { accepted, counts: *counts, flow_rates, allocation, cycle })
    }

    /// Validate raw detector output, then tick. Invalid input leaves the history untouched.
    pub fn tick_raw(&mut self, raw: &HashMap<Direction, i64>, now_us: i64) -> Result<SchedulePlan, SchedulerError> {
        let counts = validate_counts(raw)?;
        self.tick(&counts, now_us)
    }

    pub fn history(&self) -> &FlowHistory {
        &self.history
    }

    pub fn reset(&mut self) {
        self.history.reset();
    }
}
