use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use visotraf_core::{CountSnapshot, CountSource, Direction};

/// Seeded stand-in for the camera detector.
///
/// Each direction draws uniformly from `0..=2 * mean`; with probability
/// `dropout` a poll delivers nothing.
pub struct SyntheticDetector {
    rng: StdRng,
    means: [u32; 4],
    dropout: f64,
}

impl SyntheticDetector {
    pub fn new(seed: u64, means: [u32; 4], dropout: f64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            means,
            dropout: dropout.clamp(0.0, 1.0),
        }
    }
}

impl CountSource for SyntheticDetector {
    fn poll(&mut self) -> Option<CountSnapshot> {
        if self.dropout > 0.0 && self.rng.gen_bool(self.dropout) {
            return None;
        }
        let mut c = [0u32; 4];
        for dir in Direction::ALL {
            let mean = self.means[dir.index()];
            c[dir.index()] = self.rng.gen_range(0..=mean.saturating_mul(2));
        }
        Some(CountSnapshot::new(c[0], c[1], c[2], c[3]))
    }
}
