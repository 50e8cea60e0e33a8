//! Collaborator interfaces the scheduler depends on.

use crate::domain::{CountRecord, CountSnapshot};

/// Produces per-direction counts on demand (a vehicle detector).
pub trait CountSource {
    /// `None` means nothing was delivered this tick.
    fn poll(&mut self) -> Option<CountSnapshot>;
}

/// Accepts timestamped count records (an append-only log).
pub trait CountSink {
    type Error: std::error::Error + Send + Sync + 'static;

    fn append(&mut self, record: &CountRecord) -> Result<(), Self::Error>;
}

/// Sink that keeps records in memory.
impl CountSink for Vec<CountRecord> {
    type Error = std::convert::Infallible;

    fn append(&mut self, record: &CountRecord) -> Result<(), Self::Error> {
        self.push(*record);
        Ok(())
    }
}
