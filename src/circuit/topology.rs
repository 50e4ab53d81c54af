//! Per-solve snapshot of a circuit's topology.
//!
//! A [`Topology`] freezes the enumeration of junctions and branches for one
//! solve and partitions the junctions into electrically connected
//! components. Each component is grounded at its lowest-index junction.

use std::collections::HashMap;

use super::graph::Circuit;
use super::types::{BranchId, JunctionId};

/// Simple union-find over junction indices.
struct UnionFind {
    parent: Vec<usize>,
}

impl UnionFind {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra != rb {
            // Keep the smaller index as root
            let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
            self.parent[hi] = lo;
        }
    }
}

/// Stable enumeration of a circuit for one solve.
#[derive(Debug, Clone)]
pub struct Topology {
    /// Junction handles in enumeration order
    junctions: Vec<JunctionId>,
    /// Reverse mapping from handle to enumeration index
    index_of: HashMap<JunctionId, usize>,
    /// Live branches in insertion order
    branches: Vec<BranchId>,
    /// Connected component of each junction index
    component_of: Vec<usize>,
    /// Reference (ground) junction index of each component
    references: Vec<usize>,
}

impl Topology {
    /// Snapshot a circuit.
    ///
    /// # Panics
    /// Panics if a branch references a junction that is not in the circuit.
    pub fn new(circuit: &Circuit) -> Self {
        let junctions: Vec<JunctionId> = circuit.junctions().map(|j| j.id()).collect();
        let index_of: HashMap<JunctionId, usize> = junctions
            .iter()
            .enumerate()
            .map(|(i, &id)| (id, i))
            .collect();

        let mut uf = UnionFind::new(junctions.len());
        let mut branches = Vec::with_capacity(circuit.branch_count());
        for branch in circuit.branches() {
            let s = lookup(&index_of, branch.start());
            let e = lookup(&index_of, branch.end());
            if branch.component().is_conducting() {
                uf.union(s, e);
            }
            branches.push(branch.id());
        }

        // Scanning in index order makes the first junction seen in each
        // component its lowest index, which becomes the reference.
        let mut component_of = vec![0; junctions.len()];
        let mut references = Vec::new();
        let mut root_to_component: HashMap<usize, usize> = HashMap::new();
        for (i, slot) in component_of.iter_mut().enumerate() {
            let root = uf.find(i);
            *slot = *root_to_component.entry(root).or_insert_with(|| {
                references.push(i);
                references.len() - 1
            });
        }

        Self {
            junctions,
            index_of,
            branches,
            component_of,
            references,
        }
    }

    pub fn junction_count(&self) -> usize {
        self.junctions.len()
    }

    pub fn branch_count(&self) -> usize {
        self.branches.len()
    }

    /// Branch handles in solve order.
    pub fn branches(&self) -> &[BranchId] {
        &self.branches
    }

    /// Junction handles in enumeration order.
    pub fn junctions(&self) -> &[JunctionId] {
        &self.junctions
    }

    /// Enumeration index of a junction.
    ///
    /// # Panics
    /// Panics if the junction was not in the circuit when the snapshot was
    /// taken.
    pub fn junction_index(&self, id: JunctionId) -> usize {
        lookup(&self.index_of, id)
    }

    /// Number of connected components, counting isolated junctions.
    pub fn component_count(&self) -> usize {
        self.references.len()
    }

    /// Whether the junction at `index` is its component's zero reference.
    pub fn is_reference(&self, index: usize) -> bool {
        self.references[self.component_of[index]] == index
    }
}

fn lookup(index_of: &HashMap<JunctionId, usize>, id: JunctionId) -> usize {
    match index_of.get(&id) {
        Some(&i) => i,
        None => panic!("junction {} is not part of the topology", id),
    }
}
