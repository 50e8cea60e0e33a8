use thiserror::Error;

use crate::allocator::{GreenAllocation, GreenBounds};
use crate::domain::{Axis, GroupStates, SignalState};
use crate::phase_machine::CycleSequence;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SafetyViolation {
    #[error("phase {phase} shows green on both axes")]
    ConflictingGreens { phase: &'static str },
    #[error("phase {to} turns green without yellow and all-red after the opposing green")]
    MissingClearance { to: &'static str },
    #[error("{movement} green of {value}s outside [{min}, {max}]")]
    DurationOutOfBounds { movement: &'static str, value: f64, min: f64, max: f64 },
    #[error("cycle has no phases")]
    EmptyCycle,
}

fn green_axis(states: &GroupStates) -> Option<Axis> {
    [Axis::NorthSouth, Axis::EastWest]
        .into_iter()
        .find(|a| states.any_on_axis(*a, SignalState::Green))
}

/// Check the interlock over one cycle, including the wrap from last phase to first.
///
/// No phase may show green on both axes, and between the greens of opposing
/// axes there must be at least one yellow phase and one all-red phase.
pub fn verify_cycle(cycle: &CycleSequence) -> Result<(), SafetyViolation> {
    let phases = cycle.phases();
    if phases.is_empty() {
        return Err(SafetyViolation::EmptyCycle);
    }
    for p in phases {
        if p.states.any_on_axis(Axis::NorthSouth, SignalState::Green)
            && p.states.any_on_axis(Axis::EastWest, SignalState::Green)
        {
            return Err(SafetyViolation::ConflictingGreens { phase: p.name() });
        }
    }

    let mut last_green: Option<Axis> = None;
    let mut saw_yellow = false;
    let mut saw_all_red = false;
    // two passes so the 6 -> 1 transition is checked with full context
    for p in phases.iter().chain(phases.iter()) {
        match green_axis(&p.states) {
            Some(axis) => {
                if last_green == Some(axis.opposing()) && !(saw_yellow && saw_all_red) {
                    return Err(SafetyViolation::MissingClearance { to: p.name() });
                }
                last_green = Some(axis);
                saw_yellow = false;
                saw_all_red = false;
            }
            None => {
                saw_yellow |= p.states.any(SignalState::Yellow);
                saw_all_red |= p.states.is_all_red();
            }
        }
    }
    Ok(())
}

/// Every allocated duration must sit inside its movement's bounds.
pub fn check_allocation(a: &GreenAllocation, b: &GreenBounds) -> Result<(), SafetyViolation> {
    let checks = [
        ("main_ns", a.main_ns_s, b.min_green_s, b.max_green_s),
        ("main_eo", a.main_eo_s, b.min_green_s, b.max_green_s),
        ("turn_ns", a.turn_ns_s, b.min_turn_s, b.max_turn_s),
        ("turn_eo", a.turn_eo_s, b.min_turn_s, b.max_turn_s),
    ];
    for (movement, value, min, max) in checks {
        if !(value >= min && value <= max) {
            return Err(SafetyViolation::DurationOutOfBounds { movement, value, min, max });
        }
    }
    Ok(())
}
