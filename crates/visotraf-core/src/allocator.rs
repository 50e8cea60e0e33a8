use serde::{Deserialize, Serialize};

use crate::domain::{Axis, CountSnapshot};
use crate::estimator::FlowRates;

/// Safety limits for green durations, in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreenBounds {
    pub min_green_s: f64,
    pub max_green_s: f64,
    pub min_turn_s: f64,
    pub max_turn_s: f64,
    /// Current-interval axis count at which the turn term saturates.
    pub turn_saturation_count: f64,
}

impl Default for GreenBounds {
    fn default() -> Self {
        Self {
            min_green_s: 20.0,
            max_green_s: 90.0,
            min_turn_s: 15.0,
            max_turn_s: 30.0,
            turn_saturation_count: 30.0,
        }
    }
}

/// Green time per movement for one cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GreenAllocation {
    pub main_ns_s: f64,
    pub turn_ns_s: f64,
    pub main_eo_s: f64,
    pub turn_eo_s: f64,
}

impl GreenAllocation {
    pub fn minimum(bounds: &GreenBounds) -> Self {
        Self {
            main_ns_s: bounds.min_green_s,
            turn_ns_s: bounds.min_turn_s,
            main_eo_s: bounds.min_green_s,
            turn_eo_s: bounds.min_turn_s,
        }
    }

    pub fn main(&self, axis: Axis) -> f64 {
        match axis {
            Axis::NorthSouth => self.main_ns_s,
            Axis::EastWest => self.main_eo_s,
        }
    }

    pub fn turn(&self, axis: Axis) -> f64 {
        match axis {
            Axis::NorthSouth => self.turn_ns_s,
            Axis::EastWest => self.turn_eo_s,
        }
    }
}

/// Like `f64::clamp`, without the panic on inverted bounds.
fn bound(v: f64, lo: f64, hi: f64) -> f64 {
    v.max(lo).min(hi)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct GreenTimeAllocator {
    pub bounds: GreenBounds,
}

impl GreenTimeAllocator {
    pub fn new(bounds: GreenBounds) -> Self {
        Self { bounds }
    }

    /// Split green time between the axes in proportion to smoothed flow.
    ///
    /// Main greens follow the hourly flow rates; turn greens follow the raw
    /// counts of the current interval so they react faster.
    pub fn allocate(&self, rates: &FlowRates, current: &CountSnapshot) -> GreenAllocation {
        let b = &self.bounds;
        let ns_flow = rates.axis_flow(Axis::NorthSouth);
        let eo_flow = rates.axis_flow(Axis::EastWest);
        let total = ns_flow + eo_flow;
        if total == 0 {
            return GreenAllocation::minimum(b);
        }

        let ns_ratio = ns_flow as f64 / total as f64;
        let eo_ratio = eo_flow as f64 / total as f64;
        // bounds are enforced here, not by the ratio formula
        let main = |ratio: f64| {
            bound(b.min_green_s + (b.max_green_s - b.min_green_s) * ratio, b.min_green_s, b.max_green_s)
        };
        let turn = |axis: Axis| {
            let load = f64::from(current.axis_total(axis)) / b.turn_saturation_count;
            bound(b.min_turn_s + (b.max_turn_s - b.min_turn_s) * load, b.min_turn_s, b.max_turn_s)
        };

        let alloc = GreenAllocation {
            main_ns_s: main(ns_ratio),
            turn_ns_s: turn(Axis::NorthSouth),
            main_eo_s: main(eo_ratio),
            turn_eo_s: turn(Axis::EastWest),
        };
        log::debug!(
            "allocation ns_flow={} eo_flow={} -> {:?}",
            ns_flow,
            eo_flow,
            alloc
        );
        alloc
    }
}
