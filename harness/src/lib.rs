//! Isolation harness for uidgraph.
//!
//! # Architecture
//!
//! ```text
//! Coordinator::run ──> ContextLauncher::measure(state, op) ──> Outcome
//!        │                     │ (ForkLauncher: fork + pipe + waitpid)
//!        v                     v
//!   GraphEmitter         child: set_state → op.apply → state → write → _exit
//! ```
//!
//! The coordinator is strictly sequential: it waits for each context before
//! starting the next. Context creation failures are retried per [`SpawnRetry`].

mod context;
mod coordinator;
#[cfg(any(target_os = "linux", target_os = "android"))]
mod fork;
#[cfg(any(target_os = "linux", target_os = "android"))]
mod primitives;
mod retry;

pub use context::{ContextLauncher, LostReason, Outcome, SpawnError};
pub use coordinator::{Coordinator, HarnessError, RunSummary};
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use fork::ForkLauncher;
#[cfg(any(target_os = "linux", target_os = "android"))]
pub use primitives::OsPrimitives;
pub use retry::{BackoffConfig, SpawnRetry};
