//! The seam between the coordinator and whatever runs a measurement.

use std::io;

use thiserror::Error;
use uidgraph_types::{IdentityState, Operation};

/// Runs one (state, operation) measurement in a fresh, disposable context.
///
/// Implementations must never let two measurements share identity state.
pub trait ContextLauncher {
    fn measure(
        &mut self,
        state: IdentityState,
        operation: &Operation,
    ) -> Result<Outcome, SpawnError>;
}

/// What a context that did start reported back.
#[derive(Debug)]
pub enum Outcome {
    Observed(IdentityState),
    Lost(LostReason),
}

/// The context could not be created. Always retryable.
#[derive(Debug, Error)]
pub enum SpawnError {
    #[error("pipe: {0}")]
    Pipe(#[source] io::Error),
    #[error("fork: {0}")]
    Fork(#[source] io::Error),
}

/// The context started but no resulting triple came back.
#[derive(Debug, Error)]
pub enum LostReason {
    #[error("context exited with status {0} before reporting")]
    Exited(i32),
    #[error("context killed by signal {0}")]
    Signaled(i32),
    #[error("context reported {0} of 12 bytes")]
    ShortReport(usize),
    #[error("reading context report: {0}")]
    Read(#[source] io::Error),
    #[error("waiting for context: {0}")]
    Wait(#[source] io::Error),
}
