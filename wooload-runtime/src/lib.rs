//! Runtime components for wooload
//!
//! This crate drives the account flow: one [`AccountFlow`] iteration per
//! loop of a virtual user, with virtual users started and retired by a
//! [`ScenarioRunner`] according to the configured executor.

pub mod error;
pub mod executor;
pub mod flow;
pub mod summary;
pub mod vu;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use error::{FailureKind, FlowError, RunError};
pub use executor::{target_vus, ScenarioRunner};
pub use flow::AccountFlow;
pub use summary::{RunMetadata, RunReport};
pub use vu::{VirtualUser, VuStats};
