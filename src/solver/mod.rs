//! MNA (Modified Nodal Analysis) solver.
//!
//! This module provides the numerical engine behind every clock tick.
//!
//! ## Modified Nodal Analysis
//!
//! MNA assembles a system of equations Ax = z where:
//! - x contains node voltages and battery source currents
//! - A is the conductance/coefficient matrix
//! - z is the source vector
//!
//! The matrix structure is:
//! ```text
//! [ G   B ] [ v ]   [ 0 ]
//! [ C   D ] [ j ] = [ e ]
//! ```
//!
//! where:
//! - G is the conductance matrix (node equations)
//! - B, C connect batteries to nodes
//! - D holds battery internal resistances (zero for ideal sources)
//! - v is the vector of non-reference node voltages
//! - j is the vector of battery source currents
//! - e is the vector of battery EMFs
//!
//! One reference junction per connected component is fixed at 0 V and
//! left out of v, which removes the one redundant KCL equation each
//! component would otherwise contribute.
//!
//! ## Pipeline
//!
//! [`Topology`](crate::circuit::Topology) → [`assemble`] →
//! [`MnaMatrix::factor`]/[`MnaMatrix::solve`] → [`apply_solution`]

mod apply;
mod assemble;
mod circuit_solver;
mod mna;
mod solution;

pub use apply::{apply_cleared, apply_solution};
pub use assemble::{assemble, AssembledSystem, UnknownLayout};
pub use circuit_solver::{solve, CircuitSolver, SolveOutcome, SolveReport, SolverConfig};
pub use mna::MnaMatrix;
pub use solution::Solution;

/// Minimum resistance used for stamping (ohms).
pub const DEFAULT_MIN_RESISTANCE: f64 = 1e-4;

/// Zero-pivot threshold, relative to the largest entry after row
/// equilibration.
pub const DEFAULT_PIVOT_TOLERANCE: f64 = 1e-13;

/// Circuits with fewer branches than this are not solved.
pub const MIN_SOLVABLE_BRANCHES: usize = 2;
