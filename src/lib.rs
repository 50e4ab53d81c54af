//! # CCK Core
//!
//! The circuit solver behind a circuit construction kit simulation.
//!
//! This library provides:
//! - An editable circuit graph of junctions and branches (resistors, wires,
//!   bulbs, batteries, switches) addressed by stable handles
//! - Modified Nodal Analysis (MNA) assembly with per-component grounding
//! - A dense LU solver with scale-independent singularity detection
//! - Batched write-back of voltages and currents with a single observer
//!   notification per solve
//!
//! ## Architecture
//!
//! - [`circuit`] - Circuit graph, per-solve topology snapshot, observers
//! - [`components`] - Branch payloads and their parameter validation
//! - [`solver`] - MNA assembly, linear solving and result application
//! - [`error`] - Unified error type
//!
//! ## Usage
//!
//! ```
//! use cck_core::{solve, Circuit};
//!
//! let mut circuit = Circuit::new();
//! let neg = circuit.add_junction();
//! let pos = circuit.add_junction();
//! let battery = circuit.add_battery(neg, pos, 9.0)?;
//! let resistor = circuit.add_resistor(pos, neg, 3.0)?;
//!
//! solve(&mut circuit)?;
//!
//! assert!((circuit.branch(battery).unwrap().current() - 3.0).abs() < 1e-9);
//! assert!((circuit.branch(resistor).unwrap().voltage_drop() - 9.0).abs() < 1e-9);
//! # Ok::<(), cck_core::CckError>(())
//! ```
//!
//! ## Sign Conventions
//!
//! - A branch's `current` is positive when conventional current flows from
//!   its `start` junction to its `end` junction.
//! - A branch's `voltage_drop` is `V(start) - V(end)`, so a resistive branch
//!   always satisfies `current = voltage_drop / resistance`.
//! - A battery's `start` is its negative terminal. A discharging battery
//!   reports a positive current and a negative voltage drop.
//!
//! ## Solving Method
//!
//! On every tick:
//!
//! 1. Snapshot the topology and ground one junction per connected component
//! 2. Stamp conductances and battery constraints into A and z
//! 3. Solve Ax = z for node voltages and battery currents
//! 4. Write drops and currents back to every branch in one batch
//!
//! Circuits with fewer than two branches are not solved; their solved state
//! is reset to zero instead.

pub mod circuit;
pub mod components;
pub mod error;
pub mod solver;

// Re-export main types for convenience
pub use circuit::{Branch, BranchId, Circuit, CircuitEvent, CircuitObserver, Junction, JunctionId};
pub use components::{Battery, Component, ResistiveKind, Resistor, Switch};
pub use error::{CckError, Result};
pub use solver::{solve, CircuitSolver, SolveOutcome, SolveReport, SolverConfig};

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

#[cfg(feature = "wasm")]
pub use wasm::WasmCircuit;
