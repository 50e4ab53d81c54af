//! Writing solved state back onto a circuit.

use crate::circuit::{BranchId, Circuit, Topology};
use crate::components::Component;

use super::solution::Solution;

/// Write a solution onto the circuit's junctions and branches.
///
/// All writes happen inside one batch, so observers are notified once with
/// the full set of changes.
///
/// # Panics
/// Panics if the circuit was edited after `topology` was taken.
pub fn apply_solution(
    circuit: &mut Circuit,
    topology: &Topology,
    solution: &Solution,
    min_resistance: f64,
) {
    let updates: Vec<(BranchId, f64, f64)> = topology
        .branches()
        .iter()
        .map(|&id| {
            let (drop, current) = branch_state(circuit, topology, solution, id, min_resistance);
            (id, drop, current)
        })
        .collect();

    let mut batch = circuit.batch();
    for (i, &junction) in topology.junctions().iter().enumerate() {
        batch.set_junction_voltage(junction, solution.voltage(i));
    }
    for (id, drop, current) in updates {
        log::trace!("{}: drop {:.6e} V, current {:.6e} A", id, drop, current);
        batch.set_branch(id, drop, current);
    }
}

/// Reset every branch and junction of a degenerate circuit to zero.
pub fn apply_cleared(circuit: &mut Circuit) {
    let branches: Vec<BranchId> = circuit.branches().map(|b| b.id()).collect();
    let junctions: Vec<_> = circuit.junctions().map(|j| j.id()).collect();

    let mut batch = circuit.batch();
    batch.mark_cleared();
    for junction in junctions {
        batch.set_junction_voltage(junction, 0.0);
    }
    for id in branches {
        batch.set_branch(id, 0.0, 0.0);
    }
}

/// Voltage drop `V(start) - V(end)` and current `start -> end` of a branch.
fn branch_state(
    circuit: &Circuit,
    topology: &Topology,
    solution: &Solution,
    id: BranchId,
    min_resistance: f64,
) -> (f64, f64) {
    let branch = circuit
        .branch(id)
        .unwrap_or_else(|| panic!("branch {} missing from circuit", id));
    let v_start = solution.junction_voltage(topology, branch.start());
    let v_end = solution.junction_voltage(topology, branch.end());
    let drop = v_start - v_end;

    match branch.component() {
        Component::Battery(b) => {
            let current = solution
                .source_current(id)
                .unwrap_or_else(|| panic!("battery {} has no source current", id));
            (-b.terminal_voltage(current), current)
        }

        component => match component.effective_resistance(min_resistance) {
            Some(r) => (drop, drop / r),
            // Open switch: no current, but the voltage across it is real
            None => (drop, 0.0),
        },
    }
}
