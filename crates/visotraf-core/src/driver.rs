use crate::container::IntersectionContainer;
use crate::controller::{SchedulePlan, SchedulerError};
use crate::domain::CountRecord;
use crate::phase_machine::{MirroredTurnSequencer, PhaseSequencer};
use crate::ports::{CountSink, CountSource};

/// Wires a detector and a count log around one intersection.
pub struct IntersectionDriver<Src, Snk, S: PhaseSequencer = MirroredTurnSequencer> {
    pub intersection: IntersectionContainer<S>,
    source: Src,
    sink: Snk,
}

impl<Src, Snk, S> IntersectionDriver<Src, Snk, S>
where
    Src: CountSource,
    Snk: CountSink,
    S: PhaseSequencer,
{
    pub fn new(intersection: IntersectionContainer<S>, source: Src, sink: Snk) -> Self {
        Self { intersection, source, sink }
    }

    /// Poll the detector once and tick. Accepted samples are appended to the sink.
    ///
    /// Returns `Ok(None)` when the detector delivered nothing.
    ///
    /// The sample is committed to history before the append. If the sink then
    /// fails, the error is returned but the sample stays in history and is
    /// missing from the log; the next accepted tick is 10 s later either way.
    pub fn step(&mut self, now_us: i64) -> Result<Option<SchedulePlan>, SchedulerError> {
        let Some(counts) = self.source.poll() else {
            log::warn!("intersection {}: no counts delivered at {}us", self.intersection.id, now_us);
            return Ok(None);
        };
        let plan = self.intersection.tick(&counts, now_us)?;
        if plan.accepted {
            self.sink
                .append(&CountRecord { ts_us: now_us, counts })
                .map_err(|e| {
                    log::error!(
                        "intersection {}: sample at {}us accepted but not logged: {}",
                        self.intersection.id,
                        now_us,
                        e
                    );
                    SchedulerError::Sink(Box::new(e))
                })?;
        }
        Ok(Some(plan))
    }

    pub fn sink(&self) -> &Snk {
        &self.sink
    }

    pub fn into_parts(self) -> (IntersectionContainer<S>, Src, Snk) {
        (self.intersection, self.source, self.sink)
    }
}
