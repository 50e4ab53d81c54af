//! Core types for circuit representation.

use std::fmt;

/// Handle to a junction (circuit node) in a [`Circuit`](super::Circuit).
///
/// Handles are never reused while the circuit lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct JunctionId(pub usize);

impl fmt::Display for JunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "J{}", self.0)
    }
}

/// Handle to a branch (two-terminal element) in a [`Circuit`](super::Circuit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BranchId(pub usize);

impl fmt::Display for BranchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "B{}", self.0)
    }
}

/// Handle returned when registering a circuit observer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObserverId(pub usize);

/// Variable index in the MNA solution vector.
/// Can be either a node voltage or a battery source current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarIndex {
    /// Voltage unknown of a non-reference junction
    Voltage(usize),
    /// Source current unknown of the n-th battery
    Current(usize),
}

impl VarIndex {
    /// Get the raw index into the solution vector.
    /// Node voltages come first, then battery currents.
    pub fn to_index(&self, num_voltage_unknowns: usize) -> usize {
        match self {
            VarIndex::Voltage(n) => {
                debug_assert!(*n < num_voltage_unknowns, "voltage unknown out of range");
                *n
            }
            VarIndex::Current(b) => num_voltage_unknowns + b,
        }
    }
}
