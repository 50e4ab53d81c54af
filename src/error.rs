//! Error types for the CCK circuit solver.
//!
//! This module provides a unified error type [`CckError`] that covers
//! all error conditions that can occur during circuit editing, topology
//! validation, and solving.

use thiserror::Error;

use crate::circuit::{BranchId, JunctionId};

/// Result type alias using [`CckError`].
pub type Result<T> = std::result::Result<T, CckError>;

/// Unified error type for all CCK solver operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CckError {
    // ============ Parameter Errors ============
    /// Resistance must be finite and strictly positive
    #[error("Invalid resistance {value} ohm: must be finite and greater than zero")]
    InvalidResistance { value: f64 },

    /// Battery EMF must be finite and non-negative
    #[error("Invalid battery EMF {value} V: must be finite and non-negative")]
    InvalidEmf { value: f64 },

    /// Battery internal resistance must be finite and non-negative
    #[error("Invalid internal resistance {value} ohm: must be finite and non-negative")]
    InvalidInternalResistance { value: f64 },

    /// Setter does not apply to the branch's component
    #[error("Branch {branch} is a {actual}, expected {expected}")]
    ComponentMismatch {
        branch: BranchId,
        expected: &'static str,
        actual: &'static str,
    },

    // ============ Topology Errors ============
    /// Junction handle does not refer to a live junction
    #[error("Junction {junction} not found in circuit")]
    UnknownJunction { junction: JunctionId },

    /// Branch handle does not refer to a live branch
    #[error("Branch {branch} not found in circuit")]
    UnknownBranch { branch: BranchId },

    /// Both ends of a branch on the same junction
    #[error("Branch cannot start and end at the same junction {junction}")]
    SelfLoop { junction: JunctionId },

    /// Junction still referenced by branches
    #[error("Junction {junction} is still used by {branches} branch(es)")]
    JunctionInUse { junction: JunctionId, branches: usize },

    /// Invalid circuit topology
    #[error("Invalid circuit topology: {message}")]
    InvalidTopology { message: String },

    // ============ Solver Errors ============
    /// Matrix is singular and cannot be solved
    #[error("Singular matrix - circuit may contain conflicting ideal batteries")]
    SingularMatrix,

    /// Non-finite value in the solution vector
    #[error("Numerical overflow in unknown {index} (value: {value:.2e})")]
    NumericalOverflow { index: usize, value: f64 },

    /// Invalid solver configuration
    #[error("Invalid solver configuration: {message}")]
    InvalidConfig { message: String },
}

impl CckError {
    /// Create an invalid topology error
    pub fn invalid_topology(message: impl Into<String>) -> Self {
        Self::InvalidTopology {
            message: message.into(),
        }
    }

    /// Create an invalid configuration error
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: message.into(),
        }
    }
}
