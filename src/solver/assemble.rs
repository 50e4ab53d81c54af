//! Matrix assembly: stamping a circuit snapshot into an [`MnaMatrix`].

use crate::circuit::{BranchId, Circuit, Topology, VarIndex};
use crate::components::Component;

use super::mna::MnaMatrix;
use super::SolverConfig;

/// Mapping from circuit elements to rows/columns of the MNA system.
#[derive(Debug, Clone)]
pub struct UnknownLayout {
    /// Voltage unknown of each junction index; `None` for references
    voltage_index: Vec<Option<usize>>,
    num_voltages: usize,
    /// Batteries in branch order, each owning one current unknown
    sources: Vec<BranchId>,
}

impl UnknownLayout {
    /// Lay out unknowns for a topology: non-reference junctions in
    /// enumeration order, then one current per battery.
    pub fn new(circuit: &Circuit, topology: &Topology) -> Self {
        let mut voltage_index = Vec::with_capacity(topology.junction_count());
        let mut num_voltages = 0;
        for i in 0..topology.junction_count() {
            if topology.is_reference(i) {
                voltage_index.push(None);
            } else {
                voltage_index.push(Some(num_voltages));
                num_voltages += 1;
            }
        }

        let sources = topology
            .branches()
            .iter()
            .copied()
            .filter(|&id| branch_component(circuit, id).is_source())
            .collect();

        Self {
            voltage_index,
            num_voltages,
            sources,
        }
    }

    /// Total number of unknowns.
    pub fn size(&self) -> usize {
        self.num_voltages + self.sources.len()
    }

    pub fn num_voltage_unknowns(&self) -> usize {
        self.num_voltages
    }

    pub fn num_sources(&self) -> usize {
        self.sources.len()
    }

    /// Battery branches in the order of their current unknowns.
    pub fn sources(&self) -> &[BranchId] {
        &self.sources
    }

    /// Matrix index of a junction's voltage, `None` for a reference.
    pub fn node_index(&self, junction_index: usize) -> Option<usize> {
        self.voltage_index[junction_index]
            .map(|n| VarIndex::Voltage(n).to_index(self.num_voltages))
    }

    /// Matrix index of the n-th battery's source current.
    pub fn source_index(&self, n: usize) -> usize {
        VarIndex::Current(n).to_index(self.num_voltages)
    }
}

/// An assembled but not yet solved system.
#[derive(Debug, Clone)]
pub struct AssembledSystem {
    pub matrix: MnaMatrix,
    pub layout: UnknownLayout,
}

/// Stamp every branch of the snapshot into a fresh MNA system.
///
/// # Panics
/// Panics if the topology lists a branch the circuit no longer holds.
pub fn assemble(circuit: &Circuit, topology: &Topology, config: &SolverConfig) -> AssembledSystem {
    let layout = UnknownLayout::new(circuit, topology);
    let mut matrix = MnaMatrix::new(layout.size()).with_pivot_tolerance(config.pivot_tolerance);

    let mut next_source = 0;
    for &id in topology.branches() {
        let branch = circuit
            .branch(id)
            .unwrap_or_else(|| panic!("branch {} missing from circuit", id));
        let n_start = layout.node_index(topology.junction_index(branch.start()));
        let n_end = layout.node_index(topology.junction_index(branch.end()));

        match branch.component() {
            Component::Resistor(r) => {
                if r.resistance() < config.min_resistance {
                    log::debug!(
                        "{} {}: resistance {:.3e} ohm clamped to {:.3e} ohm",
                        r.kind.name(),
                        id,
                        r.resistance(),
                        config.min_resistance
                    );
                }
                matrix.stamp_conductance(n_start, n_end, r.conductance(config.min_resistance));
            }

            Component::Battery(b) => {
                let br = layout.source_index(next_source);
                next_source += 1;
                matrix.stamp_battery(n_start, n_end, br, b.emf(), b.internal_resistance());
            }

            Component::Switch(s) => {
                if let Some(g) = s.conductance(config.min_resistance) {
                    matrix.stamp_conductance(n_start, n_end, g);
                }
            }
        }
    }

    debug_assert_eq!(next_source, layout.num_sources());

    AssembledSystem { matrix, layout }
}

fn branch_component(circuit: &Circuit, id: BranchId) -> &Component {
    circuit
        .branch(id)
        .unwrap_or_else(|| panic!("branch {} missing from circuit", id))
        .component()
}
