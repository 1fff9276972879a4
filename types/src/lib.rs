//! Core domain types for uidgraph.
//!
//! This crate contains pure domain types with no IO and minimal dependencies:
//! uids and identity triples, the tagged [`Operation`] sum type, and the two
//! generators that enumerate the state space and the operation catalog for a
//! chosen [`ValueSet`].
//!
//! The OS surface is abstracted behind [`IdentityPrimitives`] so the harness can
//! bind it to real syscalls and tests can bind it to a simulated kernel.

#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod identity;
mod operation;
mod space;

pub use identity::{IdentityState, TransitionEdge, Uid, UidArg};
pub use operation::{ArgList, IdentityPrimitives, Operation};
pub use space::{CatalogError, OperationCatalog, StateSpace, ValueSet, ValueSetError};
