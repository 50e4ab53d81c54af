//! Circuit graph representation and validation.
//!
//! This module provides the topology model the solver works on. The
//! [`Circuit`] arena holds junctions and branches addressed by handles,
//! [`Topology`] freezes an enumeration for one solve, and a scoped batch
//! guard writes solved state back with a single observer notification.

mod batch;
mod graph;
mod topology;
mod types;
mod validate;

pub use batch::{BranchState, CircuitEvent, CircuitObserver};
pub use graph::{Branch, Circuit, Junction};
pub use topology::Topology;
pub use types::*;
pub use validate::validate_circuit;
