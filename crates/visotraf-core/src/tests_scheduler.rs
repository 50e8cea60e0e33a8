use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::allocator::{GreenAllocation, GreenBounds};
use crate::config::SchedulerConfig;
use crate::controller::{Scheduler, SchedulerError};
use crate::domain::{Axis, CountSnapshot, Direction, GroupStates, SignalState};
use crate::phase_machine::{CycleSequence, Phase, PhaseKind, PhaseSequencer, ALL_RED_S, YELLOW_S};
use crate::safety::{verify_cycle, SafetyViolation};

const STEP_US: i64 = 10_000_000;

#[test]
fn reference_scenario_splits_120s_cycle() {
    let mut s = Scheduler::new(SchedulerConfig::default());
    let plan = s.tick(&CountSnapshot::new(10, 10, 2, 2), 0).unwrap();
    let ns = plan.flow_rates.axis_flow(Axis::NorthSouth) as f64;
    let eo = plan.flow_rates.axis_flow(Axis::EastWest) as f64;
    assert!((ns / (ns + eo) - 0.833).abs() < 1e-3);
    assert!((eo / (ns + eo) - 0.167).abs() < 1e-3);
    assert!((plan.allocation.main_ns_s - 78.3).abs() < 0.05);
    assert!((plan.allocation.main_eo_s - 31.7).abs() < 0.05);
    assert!((plan.cycle.total_duration_s() - 120.0).abs() < 1e-9);
}

#[test]
fn zero_traffic_yields_minimum_plan() {
    let mut s = Scheduler::new(SchedulerConfig::default());
    let plan = s.tick(&CountSnapshot::default(), 0).unwrap();
    assert_eq!(
        plan.allocation,
        GreenAllocation { main_ns_s: 20.0, turn_ns_s: 15.0, main_eo_s: 20.0, turn_eo_s: 15.0 }
    );
    assert_eq!(plan.cycle.total_duration_s(), 20.0 + 20.0 + 2.0 * (YELLOW_S + ALL_RED_S));
}

#[test]
fn bounds_hold_across_long_run() {
    let mut s = Scheduler::new(SchedulerConfig::default());
    let b = GreenBounds::default();
    let mut rng = StdRng::seed_from_u64(7);
    for i in 0..200i64 {
        let c = CountSnapshot::new(
            rng.gen_range(0..50),
            rng.gen_range(0..5),
            rng.gen_range(0..80),
            rng.gen_range(0..3),
        );
        let a = s.tick(&c, i * 3_000_000).unwrap().allocation;
        for v in [a.main_ns_s, a.main_eo_s] {
            assert!(v >= b.min_green_s && v <= b.max_green_s);
        }
        for v in [a.turn_ns_s, a.turn_eo_s] {
            assert!(v >= b.min_turn_s && v <= b.max_turn_s);
        }
    }
}

#[test]
fn debounced_tick_leaves_history_unchanged() {
    let mut s = Scheduler::new(SchedulerConfig::default());
    assert!(s.tick(&CountSnapshot::new(4, 4, 4, 4), 0).unwrap().accepted);
    let plan = s.tick(&CountSnapshot::new(40, 0, 0, 0), STEP_US - 1).unwrap();
    assert!(!plan.accepted);
    assert_eq!(s.history().samples(Direction::North).to_vec(), vec![4]);
    // flow still reflects history only, but turn greens react to the fresh counts
    assert_eq!(plan.allocation.main_ns_s, plan.allocation.main_eo_s);
    assert_eq!(plan.allocation.turn_ns_s, 30.0);
}

#[test]
fn history_keeps_six_most_recent_after_ten_ticks() {
    let mut s = Scheduler::new(SchedulerConfig::default());
    for i in 0..10u32 {
        s.tick(&CountSnapshot::new(i, 0, 0, 0), i as i64 * STEP_US).unwrap();
    }
    assert_eq!(s.history().samples(Direction::North).to_vec(), vec![4, 5, 6, 7, 8, 9]);
}

#[test]
fn smoothing_lags_behind_a_burst() {
    let mut s = Scheduler::new(SchedulerConfig::default());
    for i in 0..6 {
        s.tick(&CountSnapshot::new(2, 2, 2, 2), i * STEP_US).unwrap();
    }
    let plan = s.tick(&CountSnapshot::new(20, 20, 2, 2), 6 * STEP_US).unwrap();
    // one burst sample among six: NS share is 60 / 84, well short of 40 / 44
    let ns = plan.flow_rates.axis_flow(Axis::NorthSouth) as f64;
    let eo = plan.flow_rates.axis_flow(Axis::EastWest) as f64;
    assert!(ns / (ns + eo) < 40.0 / 44.0);
    assert!(plan.allocation.main_ns_s > plan.allocation.main_eo_s);
}

#[test]
fn every_cycle_is_interlocked() {
    let mut s = Scheduler::new(SchedulerConfig::default());
    for i in 0..30u32 {
        let plan = s.tick(&CountSnapshot::new(i, 30 - i, i * 2, 1), i as i64 * STEP_US).unwrap();
        assert_eq!(verify_cycle(&plan.cycle), Ok(()));
        for p in plan.cycle.phases() {
            assert!(
                !(p.states.any_on_axis(Axis::NorthSouth, SignalState::Green)
                    && p.states.any_on_axis(Axis::EastWest, SignalState::Green))
            );
        }
    }
}

#[test]
fn consecutive_cycles_recompute_durations() {
    let mut s = Scheduler::new(SchedulerConfig::default());
    let first = s.tick(&CountSnapshot::new(10, 10, 0, 0), 0).unwrap().cycle;
    let second = s.tick(&CountSnapshot::new(0, 0, 30, 30), STEP_US).unwrap().cycle;
    let kinds = |c: &CycleSequence| c.phases().iter().map(|p| p.kind).collect::<Vec<_>>();
    assert_eq!(kinds(&first), kinds(&second));
    assert_ne!(first.phases()[0].duration_s, second.phases()[0].duration_s);
    assert_eq!(first.phases()[1].duration_s, second.phases()[1].duration_s);
}

#[test]
fn custom_config_bounds_are_respected() {
    let cfg = SchedulerConfig::from_toml_str(
        r#"
        sample_interval_us = 1000000
        [bounds]
        min_green_s = 10.0
        max_green_s = 40.0
        "#,
    )
    .unwrap();
    let mut s = Scheduler::new(cfg);
    let plan = s.tick(&CountSnapshot::new(50, 50, 0, 0), 0).unwrap();
    assert_eq!(plan.allocation.main_ns_s, 40.0);
    assert_eq!(plan.allocation.main_eo_s, 10.0);
    assert!(s.tick(&CountSnapshot::default(), 1_000_000).unwrap().accepted);
}

/// Runs EO straight after NS with no clearance.
struct ShortcutSequencer;

impl PhaseSequencer for ShortcutSequencer {
    fn build(&self, a: &GreenAllocation) -> CycleSequence {
        CycleSequence::new(vec![
            Phase::new(
                PhaseKind::NsMainAndTurn,
                a.main_ns_s,
                GroupStates::axis_only(Axis::NorthSouth, SignalState::Green),
            ),
            Phase::new(
                PhaseKind::EoMainAndTurn,
                a.main_eo_s,
                GroupStates::axis_only(Axis::EastWest, SignalState::Green),
            ),
        ])
    }
}

#[test]
fn unsafe_sequencer_is_rejected_at_tick() {
    let mut s = Scheduler::with_sequencer(SchedulerConfig::default(), ShortcutSequencer);
    let err = s.tick(&CountSnapshot::new(1, 1, 1, 1), 0).unwrap_err();
    assert!(matches!(
        err,
        SchedulerError::Safety(SafetyViolation::MissingClearance { .. })
    ));
    // the failed tick must not leave its sample behind or close the gate
    assert!(s.history().samples(Direction::North).is_empty());
    assert_eq!(s.history().last_accepted_us(), None);
}

#[test]
fn failed_bounds_check_keeps_history_and_gate_open() {
    let mut cfg = SchedulerConfig::default();
    // built in code, so validate() never ran: no turn green can satisfy 40..=30
    cfg.bounds.min_turn_s = 40.0;
    let mut s = Scheduler::new(cfg);
    for now_us in [0, STEP_US] {
        let err = s.tick(&CountSnapshot::new(5, 5, 5, 5), now_us).unwrap_err();
        assert!(matches!(
            err,
            SchedulerError::Safety(SafetyViolation::DurationOutOfBounds { .. })
        ));
        assert!(s.history().samples(Direction::East).is_empty());
        assert_eq!(s.history().last_accepted_us(), None);
    }
}
