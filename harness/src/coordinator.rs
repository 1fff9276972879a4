//! The sequential measurement loop.
//!
//! States outer, operations inner, one context at a time. Every pair either
//! yields an edge, a "lost" comment, or (only under a bounded retry policy) a
//! fatal [`HarnessError::SpawnExhausted`].

use std::io::{self, Write};
use std::thread;

use thiserror::Error;
use uidgraph_dot::GraphEmitter;
use uidgraph_types::{IdentityState, Operation, OperationCatalog, StateSpace, TransitionEdge};

use crate::context::{ContextLauncher, Outcome, SpawnError};
use crate::retry::SpawnRetry;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to write graph output")]
    Output(#[from] io::Error),
    #[error("gave up creating a context for {operation} from {state} after {attempts} attempts")]
    SpawnExhausted {
        state: IdentityState,
        operation: Operation,
        attempts: u32,
        #[source]
        source: SpawnError,
    },
}

/// Counters for a finished run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub states: usize,
    pub operations: usize,
    pub edges: usize,
    pub lost: usize,
    pub spawn_failures: u64,
}

pub struct Coordinator<L> {
    launcher: L,
    retry: SpawnRetry,
}

impl<L: ContextLauncher> Coordinator<L> {
    pub fn new(launcher: L, retry: SpawnRetry) -> Self {
        Self { launcher, retry }
    }

    #[must_use]
    pub fn into_launcher(self) -> L {
        self.launcher
    }

    /// Measure every (state, operation) pair and stream the graph to `out`.
    pub fn run<W: Write>(
        &mut self,
        states: &StateSpace,
        catalog: &OperationCatalog,
        out: &mut GraphEmitter<W>,
    ) -> Result<RunSummary, HarnessError> {
        let mut summary = RunSummary {
            states: states.len(),
            operations: catalog.len(),
            ..RunSummary::default()
        };
        tracing::info!(
            states = states.len(),
            operations = catalog.len(),
            retry = ?self.retry,
            "Starting enumeration"
        );

        out.begin()?;
        match self.enumerate(states, catalog, out, &mut summary) {
            Ok(()) => {}
            // Still well-formed; the exhaustion comment marks it partial.
            Err(err @ HarnessError::SpawnExhausted { .. }) => {
                out.end()?;
                return Err(err);
            }
            Err(err) => return Err(err),
        }
        out.end()?;

        tracing::info!(
            edges = summary.edges,
            lost = summary.lost,
            spawn_failures = summary.spawn_failures,
            "Enumeration complete"
        );
        Ok(summary)
    }

    fn enumerate<W: Write>(
        &mut self,
        states: &StateSpace,
        catalog: &OperationCatalog,
        out: &mut GraphEmitter<W>,
        summary: &mut RunSummary,
    ) -> Result<(), HarnessError> {
        for (index, &state) in states.iter().enumerate() {
            out.state(index, states.len(), &state)?;
            for operation in catalog.iter() {
                match self.measure(state, operation, out, summary)? {
                    Outcome::Observed(observed) => {
                        tracing::debug!(%state, %operation, %observed, "Observed transition");
                        out.edge(&TransitionEdge {
                            source: state,
                            operation,
                            observed,
                        })?;
                        summary.edges += 1;
                    }
                    Outcome::Lost(reason) => {
                        tracing::warn!(%state, %operation, %reason, "Measurement lost");
                        out.comment(&format!("lost {operation} from {state}: {reason}"))?;
                        summary.lost += 1;
                    }
                }
            }
        }
        Ok(())
    }

    fn measure<W: Write>(
        &mut self,
        state: IdentityState,
        operation: &Operation,
        out: &mut GraphEmitter<W>,
        summary: &mut RunSummary,
    ) -> Result<Outcome, HarnessError> {
        let mut failures: u32 = 0;
        loop {
            let err = match self.launcher.measure(state, operation) {
                Ok(outcome) => return Ok(outcome),
                Err(err) => err,
            };
            failures = failures.saturating_add(1);
            summary.spawn_failures += 1;

            let Some(delay) = self.retry.next_delay(failures) else {
                tracing::error!(%state, %operation, %err, failures, "Context creation retries exhausted");
                out.comment(&format!("{err}; giving up after {failures} attempts"))?;
                return Err(HarnessError::SpawnExhausted {
                    state,
                    operation: *operation,
                    attempts: failures,
                    source: err,
                });
            };

            tracing::warn!(%state, %operation, %err, failures, "Context creation failed; retrying");
            out.comment(&format!("{err}; retrying"))?;
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }
    }
}
