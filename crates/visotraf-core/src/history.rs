use crate::domain::{CountSnapshot, Direction};

/// Samples kept per direction.
pub const HISTORY_CAPACITY: usize = 6;

/// Minimum spacing between accepted samples (10 s).
pub const DEFAULT_SAMPLE_INTERVAL_US: i64 = 10_000_000;

/// Fixed-capacity ring of the most recent counts for one direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RingBuffer {
    slots: [u32; HISTORY_CAPACITY],
    head: usize,
    len: usize,
}

impl RingBuffer {
    /// Append a sample, overwriting the oldest once full.
    pub fn push(&mut self, value: u32) {
        let tail = (self.head + self.len) % HISTORY_CAPACITY;
        self.slots[tail] = value;
        if self.len < HISTORY_CAPACITY {
            self.len += 1;
        } else {
            self.head = (self.head + 1) % HISTORY_CAPACITY;
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..self.len).map(move |i| self.slots[(self.head + i) % HISTORY_CAPACITY])
    }

    pub fn sum(&self) -> u64 {
        self.iter().map(u64::from).sum()
    }

    pub fn latest(&self) -> Option<u32> {
        self.iter().last()
    }

    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }
}

/// Rolling per-direction count history with a minimum-interval gate.
#[derive(Debug, Clone)]
pub struct FlowHistory {
    buffers: [RingBuffer; 4],
    min_interval_us: i64,
    last_accepted_us: Option<i64>,
}

impl Default for FlowHistory {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_INTERVAL_US)
    }
}

impl FlowHistory {
    pub fn new(min_interval_us: i64) -> Self {
        Self {
            buffers: [RingBuffer::default(); 4],
            min_interval_us,
            last_accepted_us: None,
        }
    }

    /// Record one snapshot if the gate is open; returns whether it was accepted.
    ///
    /// A timestamp earlier than the last accepted one keeps the gate closed.
    pub fn update(&mut self, counts: &CountSnapshot, now_us: i64) -> bool {
        if let Some(last) = self.last_accepted_us {
            let elapsed = now_us.saturating_sub(last);
            if elapsed < 0 {
                log::warn!("count timestamp went backwards by {}us; sample dropped", -elapsed);
                return false;
            }
            if elapsed < self.min_interval_us {
                log::debug!("sample debounced ({}us since last accepted)", elapsed);
                return false;
            }
        }
        for (dir, count) in counts.iter() {
            self.buffers[dir.index()].push(count);
        }
        self.last_accepted_us = Some(now_us);
        true
    }

    pub fn samples(&self, dir: Direction) -> &RingBuffer {
        &self.buffers[dir.index()]
    }

    pub fn last_accepted_us(&self) -> Option<i64> {
        self.last_accepted_us
    }

    pub fn min_interval_us(&self) -> i64 {
        self.min_interval_us
    }

    /// Forget every sample and reopen the gate.
    pub fn reset(&mut self) {
        self.buffers = [RingBuffer::default(); 4];
        self.last_accepted_us = None;
    }
}
