//! VISOTRAF core: adaptive green-time allocation and signal phase sequencing
//! for a four-way intersection.

pub mod domain;
pub mod validation;
pub mod history;
pub mod estimator;
pub mod allocator;
pub mod phase_machine;
pub mod safety;
pub mod config;
pub mod controller;
pub mod container;
pub mod ports;
pub mod driver;

pub use domain::*;
pub use validation::*;
pub use history::*;
pub use estimator::*;
pub use allocator::*;
pub use phase_machine::*;
pub use safety::*;
pub use crate::config::*;
pub use controller::*;
pub use container::*;
pub use ports::*;
pub use driver::*;

#[cfg(test)]
mod tests_scheduler;
#[cfg(test)]
mod tests_config;
