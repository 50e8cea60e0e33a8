use serde::Serialize;

use crate::domain::{Axis, Direction};
use crate::history::{FlowHistory, RingBuffer};

/// Each sample covers a 10 s slice: count / 10 s * 3600 s/h.
pub const FLOW_EXTRAPOLATION_FACTOR: u64 = 360;

/// Estimated vehicles per hour, per direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FlowRates {
    rates: [u32; 4],
}

impl FlowRates {
    pub fn new(north: u32, south: u32, east: u32, west: u32) -> Self {
        Self { rates: [north, south, east, west] }
    }

    pub fn get(&self, dir: Direction) -> u32 {
        self.rates[dir.index()]
    }

    /// Summed flow of the two legs on `axis`.
    pub fn axis_flow(&self, axis: Axis) -> u64 {
        axis.directions().iter().map(|d| u64::from(self.get(*d))).sum()
    }

    pub fn total(&self) -> u64 {
        self.axis_flow(Axis::NorthSouth) + self.axis_flow(Axis::EastWest)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FlowRateEstimator;

impl FlowRateEstimator {
    /// Hourly-equivalent rate from the average of a direction's samples; 0 when empty.
    pub fn flow_rate(&self, samples: &RingBuffer) -> u32 {
        if samples.is_empty() {
            return 0;
        }
        // floor(sum / len * 360) in exact integer arithmetic
        let rate = samples.sum() * FLOW_EXTRAPOLATION_FACTOR / samples.len() as u64;
        u32::try_from(rate).unwrap_or(u32::MAX)
    }

    pub fn estimate(&self, history: &FlowHistory) -> FlowRates {
        let mut rates = [0u32; 4];
        for dir in Direction::ALL {
            rates[dir.index()] = self.flow_rate(history.samples(dir));
        }
        FlowRates { rates }
    }
}
