//! Fixed six-phase signal cycle.
//!
//! Topology and clearance intervals never change; only the green durations
//! are substituted on every build.

use serde::Serialize;

use crate::allocator::GreenAllocation;
use crate::domain::{Axis, GroupStates, SignalState};

pub const YELLOW_S: f64 = 3.0;
pub const ALL_RED_S: f64 = 2.0;
pub const CYCLE_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseKind {
    NsMainAndTurn,
    NsYellow,
    #[serde(rename = "ALL_RED_1")]
    AllRed1,
    EoMainAndTurn,
    EoYellow,
    #[serde(rename = "ALL_RED_2")]
    AllRed2,
}

impl PhaseKind {
    pub const ORDER: [PhaseKind; CYCLE_LEN] = [
        PhaseKind::NsMainAndTurn,
        PhaseKind::NsYellow,
        PhaseKind::AllRed1,
        PhaseKind::EoMainAndTurn,
        PhaseKind::EoYellow,
        PhaseKind::AllRed2,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PhaseKind::NsMainAndTurn => "NS_MAIN_AND_TURN",
            PhaseKind::NsYellow => "NS_YELLOW",
            PhaseKind::AllRed1 => "ALL_RED_1",
            PhaseKind::EoMainAndTurn => "EO_MAIN_AND_TURN",
            PhaseKind::EoYellow => "EO_YELLOW",
            PhaseKind::AllRed2 => "ALL_RED_2",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            PhaseKind::NsMainAndTurn => "North-South through and turning traffic",
            PhaseKind::NsYellow => "North-South change interval",
            PhaseKind::AllRed1 => "Clearance before East-West",
            PhaseKind::EoMainAndTurn => "East-West through and turning traffic",
            PhaseKind::EoYellow => "East-West change interval",
            PhaseKind::AllRed2 => "Clearance before North-South",
        }
    }
}

/// One entry of the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Phase {
    #[serde(rename = "name")]
    pub kind: PhaseKind,
    pub description: &'static str,
    pub duration_s: f64,
    pub states: GroupStates,
}

impl Phase {
    pub fn new(kind: PhaseKind, duration_s: f64, states: GroupStates) -> Self {
        Self { kind, description: kind.description(), duration_s, states }
    }

    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

/// Where in the cycle a given elapsed time falls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhasePosition {
    pub index: usize,
    pub phase: Phase,
    pub remaining_s: f64,
}

/// One full, ordered signal cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleSequence {
    phases: Vec<Phase>,
}

impl CycleSequence {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self { phases }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    pub fn len(&self) -> usize {
        self.phases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    pub fn total_duration_s(&self) -> f64 {
        self.phases.iter().map(|p| p.duration_s).sum()
    }

    /// Active phase `elapsed_s` seconds after the cycle started, wrapping around.
    pub fn locate(&self, elapsed_s: f64) -> Option<PhasePosition> {
        let total = self.total_duration_s();
        if self.phases.is_empty() || total <= 0.0 || !elapsed_s.is_finite() {
            return None;
        }
        let mut t = elapsed_s.rem_euclid(total);
        for (index, phase) in self.phases.iter().enumerate() {
            if t < phase.duration_s {
                return Some(PhasePosition { index, phase: *phase, remaining_s: phase.duration_s - t });
            }
            t -= phase.duration_s;
        }
        // float residue past the last boundary
        let index = self.phases.len() - 1;
        Some(PhasePosition { index, phase: self.phases[index], remaining_s: 0.0 })
    }
}

/// Turns an allocation into a cycle.
///
/// The default implementation mirrors turn groups onto their main group;
/// an implementation with separate protected-turn phases plugs in here.
pub trait PhaseSequencer {
    fn build(&self, allocation: &GreenAllocation) -> CycleSequence;
}

/// Six-phase sequencer where turn signals always follow the main signal.
///
/// Both groups of an axis share `main_*` as their green duration;
/// the allocated `turn_*` durations are not used.
#[derive(Debug, Clone, Copy, Default)]
pub struct MirroredTurnSequencer;

impl PhaseSequencer for MirroredTurnSequencer {
    fn build(&self, allocation: &GreenAllocation) -> CycleSequence {
        use PhaseKind::*;
        let phases = vec![
            Phase::new(
                NsMainAndTurn,
                allocation.main(Axis::NorthSouth),
                GroupStates::axis_only(Axis::NorthSouth, SignalState::Green),
            ),
            Phase::new(NsYellow, YELLOW_S, GroupStates::axis_only(Axis::NorthSouth, SignalState::Yellow)),
            Phase::new(AllRed1, ALL_RED_S, GroupStates::ALL_RED),
            Phase::new(
                EoMainAndTurn,
                allocation.main(Axis::EastWest),
                GroupStates::axis_only(Axis::EastWest, SignalState::Green),
            ),
            Phase::new(EoYellow, YELLOW_S, GroupStates::axis_only(Axis::EastWest, SignalState::Yellow)),
            Phase::new(AllRed2, ALL_RED_S, GroupStates::ALL_RED),
        ];
        CycleSequence::new(phases)
    }
}
