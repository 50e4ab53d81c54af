//! Circuit validation.

use crate::components::{validate_resistance, Battery, Component};
use crate::error::{CckError, Result};

use super::Circuit;

/// Validate a circuit for solving.
///
/// Checks:
/// - Every branch references two live, distinct junctions
/// - Component parameters are within range
///
/// The editing API upholds these already; this is a consistency check for
/// callers that assemble circuits through other paths.
pub fn validate_circuit(circuit: &Circuit) -> Result<()> {
    for branch in circuit.branches() {
        for junction in branch.terminals() {
            if !circuit.contains_junction(junction) {
                return Err(CckError::invalid_topology(format!(
                    "branch {} references missing junction {}",
                    branch.id(),
                    junction
                )));
            }
        }

        if branch.start() == branch.end() {
            return Err(CckError::SelfLoop {
                junction: branch.start(),
            });
        }

        match branch.component() {
            Component::Resistor(r) => validate_resistance(r.resistance())?,
            Component::Battery(b) => {
                // Re-run the constructor checks on the stored values
                Battery::with_internal_resistance(b.emf(), b.internal_resistance())?;
            }
            Component::Switch(_) => {}
        }
    }

    Ok(())
}
