use std::sync::{Arc, Mutex, MutexGuard};

use crate::config::SchedulerConfig;
use crate::controller::{SchedulePlan, Scheduler, SchedulerError};
use crate::domain::CountSnapshot;
use crate::phase_machine::{MirroredTurnSequencer, PhaseSequencer};

/// Shareable handle to one intersection's scheduler.
///
/// Every tick runs under the intersection's own lock; intersections share nothing.
#[derive(Debug)]
pub struct IntersectionContainer<S: PhaseSequencer = MirroredTurnSequencer> {
    pub id: String,
    inner: Arc<Mutex<Scheduler<S>>>,
}

impl<S: PhaseSequencer> Clone for IntersectionContainer<S> {
    fn clone(&self) -> Self {
        Self { id: self.id.clone(), inner: Arc::clone(&self.inner) }
    }
}

impl IntersectionContainer<MirroredTurnSequencer> {
    pub fn new(id: impl Into<String>, cfg: SchedulerConfig) -> Self {
        Self::from_scheduler(id, Scheduler::new(cfg))
    }
}

impl<S: PhaseSequencer> IntersectionContainer<S> {
    pub fn from_scheduler(id: impl Into<String>, scheduler: Scheduler<S>) -> Self {
        Self { id: id.into(), inner: Arc::new(Mutex::new(scheduler)) }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Scheduler<S>>, SchedulerError> {
        self.inner.lock().map_err(|_| SchedulerError::Poisoned)
    }

    pub fn tick(&self, counts: &CountSnapshot, now_us: i64) -> Result<SchedulePlan, SchedulerError> {
        self.lock()?.tick(counts, now_us)
    }

    /// Run `f` with exclusive access to the scheduler.
    pub fn with_scheduler<R>(&self, f: impl FnOnce(&mut Scheduler<S>) -> R) -> Result<R, SchedulerError> {
        let mut guard = self.lock()?;
        Ok(f(&mut guard))
    }

    pub fn reset(&self) -> Result<(), SchedulerError> {
        self.lock()?.reset();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Direction;
    use std::thread;

    #[test]
    fn concurrent_ticks_accept_one_sample_per_window() {
        let c = IntersectionContainer::new("main-and-5th", SchedulerConfig::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let c = c.clone();
                thread::spawn(move || c.tick(&CountSnapshot::new(i, i, i, i), 1_000).unwrap().accepted)
            })
            .collect();
        let accepted = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|a| *a)
            .count();
        assert_eq!(accepted, 1);
        let len = c
            .with_scheduler(|s| s.history().samples(Direction::North).len())
            .unwrap();
        assert_eq!(len, 1);
    }

    #[test]
    fn intersections_are_independent() {
        let a = IntersectionContainer::new("a", SchedulerConfig::default());
        let b = IntersectionContainer::new("b", SchedulerConfig::default());
        assert!(a.tick(&CountSnapshot::new(1, 1, 1, 1), 0).unwrap().accepted);
        assert!(b.tick(&CountSnapshot::new(1, 1, 1, 1), 0).unwrap().accepted);
        a.reset().unwrap();
        assert!(a.with_scheduler(|s| s.history().last_accepted_us()).unwrap().is_none());
        assert_eq!(b.with_scheduler(|s| s.history().last_accepted_us()).unwrap(), Some(0));
    }
}
