//! Circuit graph structure.
//!
//! Junctions and branches live in slot arenas addressed by integer handles.
//! Removing an element vacates its slot, so handles held by the editor
//! never alias a different element.

use super::batch::{BatchUpdate, CircuitObserver, ObserverList};
use super::types::{BranchId, JunctionId, ObserverId};
use crate::components::{Battery, Component, Resistor, Switch};
use crate::error::{CckError, Result};

/// A circuit node.
#[derive(Debug, Clone, PartialEq)]
pub struct Junction {
    id: JunctionId,
    voltage: f64,
}

impl Junction {
    pub fn id(&self) -> JunctionId {
        self.id
    }

    /// Voltage from the last applied solve (volts).
    pub fn voltage(&self) -> f64 {
        self.voltage
    }

    pub(crate) fn set_voltage(&mut self, voltage: f64) {
        self.voltage = voltage;
    }
}

/// A two-terminal element connecting `start` to `end`.
///
/// `current` is positive when conventional current flows from `start` to
/// `end`; `voltage_drop` is `V(start) - V(end)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    id: BranchId,
    start: JunctionId,
    end: JunctionId,
    component: Component,
    voltage_drop: f64,
    current: f64,
}

impl Branch {
    pub fn id(&self) -> BranchId {
        self.id
    }

    pub fn start(&self) -> JunctionId {
        self.start
    }

    pub fn end(&self) -> JunctionId {
        self.end
    }

    pub fn terminals(&self) -> [JunctionId; 2] {
        [self.start, self.end]
    }

    pub fn component(&self) -> &Component {
        &self.component
    }

    /// `V(start) - V(end)` from the last applied solve.
    pub fn voltage_drop(&self) -> f64 {
        self.voltage_drop
    }

    /// Current from `start` to `end` from the last applied solve.
    pub fn current(&self) -> f64 {
        self.current
    }

    /// Power absorbed by the branch (watts). Negative for a battery
    /// delivering energy to the circuit.
    pub fn power(&self) -> f64 {
        self.voltage_drop * self.current
    }

    /// The junction at the other end from `junction`, if it is a terminal.
    pub fn opposite(&self, junction: JunctionId) -> Option<JunctionId> {
        if junction == self.start {
            Some(self.end)
        } else if junction == self.end {
            Some(self.start)
        } else {
            None
        }
    }

    pub(crate) fn set_solution(&mut self, voltage_drop: f64, current: f64) {
        self.voltage_drop = voltage_drop;
        self.current = current;
    }
}

/// A circuit being edited and solved.
#[derive(Debug, Default)]
pub struct Circuit {
    junctions: Vec<Option<Junction>>,
    branches: Vec<Option<Branch>>,
    observers: ObserverList,
}

impl Circuit {
    pub fn new() -> Self {
        Self::default()
    }

    // ============ Junctions ============

    /// Add an unconnected junction.
    pub fn add_junction(&mut self) -> JunctionId {
        let id = JunctionId(self.junctions.len());
        self.junctions.push(Some(Junction { id, voltage: 0.0 }));
        id
    }

    /// Remove a junction that no branch references.
    pub fn remove_junction(&mut self, id: JunctionId) -> Result<()> {
        self.junction(id).ok_or(CckError::UnknownJunction { junction: id })?;
        let branches = self.degree(id);
        if branches > 0 {
            return Err(CckError::JunctionInUse {
                junction: id,
                branches,
            });
        }
        self.junctions[id.0] = None;
        Ok(())
    }

    pub fn junction(&self, id: JunctionId) -> Option<&Junction> {
        self.junctions.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn junction_mut(&mut self, id: JunctionId) -> Option<&mut Junction> {
        self.junctions.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn contains_junction(&self, id: JunctionId) -> bool {
        self.junction(id).is_some()
    }

    /// Live junctions in handle order.
    pub fn junctions(&self) -> impl Iterator<Item = &Junction> {
        self.junctions.iter().flatten()
    }

    pub fn junction_count(&self) -> usize {
        self.junctions().count()
    }

    /// Number of branches attached to a junction.
    pub fn degree(&self, id: JunctionId) -> usize {
        self.branches_at(id).count()
    }

    /// Branches with a terminal on `id`.
    pub fn branches_at(&self, id: JunctionId) -> impl Iterator<Item = &Branch> {
        self.branches().filter(move |b| b.start == id || b.end == id)
    }

    /// Junctions directly connected to `id` by some branch.
    pub fn neighbors(&self, id: JunctionId) -> Vec<JunctionId> {
        let mut out: Vec<JunctionId> = self
            .branches_at(id)
            .filter_map(|b| b.opposite(id))
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// Voltage at a junction from the last applied solve.
    pub fn junction_voltage(&self, id: JunctionId) -> Option<f64> {
        self.junction(id).map(Junction::voltage)
    }

    /// Voltmeter reading `V(positive) - V(negative)`.
    ///
    /// Only meaningful for junctions in the same connected component;
    /// separate components each have their own zero reference.
    pub fn voltage_between(&self, positive: JunctionId, negative: JunctionId) -> Option<f64> {
        Some(self.junction_voltage(positive)? - self.junction_voltage(negative)?)
    }

    // ============ Branches ============

    /// Add a branch between two live, distinct junctions.
    pub fn add_branch(
        &mut self,
        start: JunctionId,
        end: JunctionId,
        component: impl Into<Component>,
    ) -> Result<BranchId> {
        for junction in [start, end] {
            if !self.contains_junction(junction) {
                return Err(CckError::UnknownJunction { junction });
            }
        }
        if start == end {
            return Err(CckError::SelfLoop { junction: start });
        }

        let id = BranchId(self.branches.len());
        self.branches.push(Some(Branch {
            id,
            start,
            end,
            component: component.into(),
            voltage_drop: 0.0,
            current: 0.0,
        }));
        Ok(id)
    }

    pub fn add_resistor(
        &mut self,
        start: JunctionId,
        end: JunctionId,
        resistance: f64,
    ) -> Result<BranchId> {
        let resistor = Resistor::new(resistance)?;
        self.add_branch(start, end, resistor)
    }

    pub fn add_wire(&mut self, start: JunctionId, end: JunctionId) -> Result<BranchId> {
        self.add_branch(start, end, Resistor::wire())
    }

    pub fn add_bulb(&mut self, start: JunctionId, end: JunctionId) -> Result<BranchId> {
        self.add_branch(start, end, Resistor::bulb())
    }

    /// Add an ideal battery with its negative terminal on `start` and its
    /// positive terminal on `end`.
    pub fn add_battery(
        &mut self,
        start: JunctionId,
        end: JunctionId,
        emf: f64,
    ) -> Result<BranchId> {
        let battery = Battery::new(emf)?;
        self.add_branch(start, end, battery)
    }

    pub fn add_switch(
        &mut self,
        start: JunctionId,
        end: JunctionId,
        closed: bool,
    ) -> Result<BranchId> {
        self.add_branch(start, end, Switch::new(closed))
    }

    /// Remove a branch, dropping any junction left without branches.
    pub fn remove_branch(&mut self, id: BranchId) -> Result<Branch> {
        let branch = self
            .branches
            .get_mut(id.0)
            .and_then(Option::take)
            .ok_or(CckError::UnknownBranch { branch: id })?;

        for junction in branch.terminals() {
            if self.degree(junction) == 0 {
                self.junctions[junction.0] = None;
            }
        }
        Ok(branch)
    }

    pub fn branch(&self, id: BranchId) -> Option<&Branch> {
        self.branches.get(id.0).and_then(Option::as_ref)
    }

    pub(crate) fn branch_mut(&mut self, id: BranchId) -> Option<&mut Branch> {
        self.branches.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Live branches in insertion order.
    pub fn branches(&self) -> impl Iterator<Item = &Branch> {
        self.branches.iter().flatten()
    }

    pub fn branch_count(&self) -> usize {
        self.branches().count()
    }

    /// The `index`-th live branch in insertion order.
    ///
    /// # Panics
    /// Panics if `index >= branch_count()`.
    pub fn branch_at(&self, index: usize) -> &Branch {
        self.branches()
            .nth(index)
            .unwrap_or_else(|| panic!("branch index {} out of range", index))
    }

    // ============ Parameter editing ============

    fn component_mut(&mut self, id: BranchId) -> Result<&mut Component> {
        self.branch_mut(id)
            .map(|b| &mut b.component)
            .ok_or(CckError::UnknownBranch { branch: id })
    }

    /// Set the resistance of a resistor, wire or bulb.
    pub fn set_resistance(&mut self, id: BranchId, resistance: f64) -> Result<()> {
        match self.component_mut(id)? {
            Component::Resistor(r) => r.set_resistance(resistance),
            other => Err(mismatch(id, "resistive element", other)),
        }
    }

    pub fn set_emf(&mut self, id: BranchId, emf: f64) -> Result<()> {
        match self.component_mut(id)? {
            Component::Battery(b) => b.set_emf(emf),
            other => Err(mismatch(id, "battery", other)),
        }
    }

    pub fn set_internal_resistance(&mut self, id: BranchId, resistance: f64) -> Result<()> {
        match self.component_mut(id)? {
            Component::Battery(b) => b.set_internal_resistance(resistance),
            other => Err(mismatch(id, "battery", other)),
        }
    }

    pub fn set_switch_closed(&mut self, id: BranchId, closed: bool) -> Result<()> {
        match self.component_mut(id)? {
            Component::Switch(s) => {
                s.set_state(closed);
                Ok(())
            }
            other => Err(mismatch(id, "switch", other)),
        }
    }

    /// Replace a branch's component, keeping its terminals.
    pub fn replace_component(
        &mut self,
        id: BranchId,
        component: impl Into<Component>,
    ) -> Result<()> {
        *self.component_mut(id)? = component.into();
        Ok(())
    }

    /// Swap a branch's terminals. For a battery this flips its polarity.
    ///
    /// The stored solution is negated so it stays consistent with the
    /// new orientation until the next solve.
    pub fn reverse_branch(&mut self, id: BranchId) -> Result<()> {
        let branch = self.branch_mut(id).ok_or(CckError::UnknownBranch { branch: id })?;
        std::mem::swap(&mut branch.start, &mut branch.end);
        branch.voltage_drop = -branch.voltage_drop;
        branch.current = -branch.current;
        Ok(())
    }

    // ============ Observers ============

    /// Register an observer notified once per applied solve.
    pub fn subscribe(&mut self, observer: Box<dyn CircuitObserver>) -> ObserverId {
        self.observers.add(observer)
    }

    /// Remove a previously registered observer.
    pub fn unsubscribe(&mut self, id: ObserverId) -> Option<Box<dyn CircuitObserver>> {
        self.observers.remove(id)
    }

    pub(crate) fn observers_mut(&mut self) -> &mut ObserverList {
        &mut self.observers
    }

    /// Start a batch of solved-state writes. Observers are notified once
    /// when the returned guard is dropped.
    pub(crate) fn batch(&mut self) -> BatchUpdate<'_> {
        BatchUpdate::new(self)
    }
}

fn mismatch(branch: BranchId, expected: &'static str, actual: &Component) -> CckError {
    CckError::ComponentMismatch {
        branch,
        expected,
        actual: actual.type_name(),
    }
}

#[cfg(test)]
impl Circuit {
    /// Vacate a junction slot even if branches still reference it.
    pub(crate) fn vacate_junction_unchecked(&mut self, id: JunctionId) {
        self.junctions[id.0] = None;
    }

    /// Move a branch's terminals without any checks.
    pub(crate) fn set_terminals_unchecked(
        &mut self,
        id: BranchId,
        start: JunctionId,
        end: JunctionId,
    ) {
        if let Some(branch) = self.branch_mut(id) {
            branch.start = start;
            branch.end = end;
        }
    }
}
