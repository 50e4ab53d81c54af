//! Solved node voltages and source currents for one solve.

use crate::circuit::{BranchId, JunctionId, Topology};

use super::assemble::UnknownLayout;

/// Result of one solve, indexed like the [`Topology`] it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// Voltage of each junction index (references are 0)
    voltages: Vec<f64>,
    /// Source current of each battery branch
    source_currents: Vec<(BranchId, f64)>,
}

impl Solution {
    /// Extract a solution from a solved unknown vector.
    pub fn from_unknowns(layout: &UnknownLayout, junction_count: usize, x: &[f64]) -> Self {
        debug_assert_eq!(x.len(), layout.size());

        let voltages = (0..junction_count)
            .map(|i| layout.node_index(i).map_or(0.0, |n| x[n]))
            .collect();

        let source_currents = layout
            .sources()
            .iter()
            .enumerate()
            .map(|(n, &id)| (id, x[layout.source_index(n)]))
            .collect();

        Self {
            voltages,
            source_currents,
        }
    }

    /// Voltage of the junction at `index`.
    pub fn voltage(&self, index: usize) -> f64 {
        self.voltages[index]
    }

    /// Voltage of a junction looked up through its snapshot.
    pub fn junction_voltage(&self, topology: &Topology, id: JunctionId) -> f64 {
        self.voltages[topology.junction_index(id)]
    }

    /// Solved current of a battery, `None` if the branch is not a source.
    pub fn source_current(&self, branch: BranchId) -> Option<f64> {
        self.source_currents
            .iter()
            .find(|(id, _)| *id == branch)
            .map(|&(_, i)| i)
    }

    pub fn source_currents(&self) -> &[(BranchId, f64)] {
        &self.source_currents
    }
}
