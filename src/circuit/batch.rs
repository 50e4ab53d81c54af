//! Batched solved-state updates and observer notification.
//!
//! Every write the solver makes to a circuit goes through a [`BatchUpdate`]
//! guard. The guard collects what changed and notifies observers exactly
//! once when it is dropped, so an observer always sees a complete
//! snapshot of one solve.

use std::fmt;

use super::graph::Circuit;
use super::types::{BranchId, JunctionId, ObserverId};

/// Solved state of one branch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchState {
    pub branch: BranchId,
    pub voltage_drop: f64,
    pub current: f64,
}

/// Notification sent to observers after solved state has been applied.
#[derive(Debug, Clone, PartialEq)]
pub enum CircuitEvent {
    /// A solution was written back to the circuit.
    Solved { changes: Vec<BranchState> },
    /// A degenerate circuit had its solved state reset to zero.
    Cleared { changes: Vec<BranchState> },
}

impl CircuitEvent {
    /// Branches whose voltage drop or current changed.
    pub fn changes(&self) -> &[BranchState] {
        match self {
            CircuitEvent::Solved { changes } | CircuitEvent::Cleared { changes } => changes,
        }
    }
}

/// Receives one [`CircuitEvent`] per applied solve.
pub trait CircuitObserver {
    fn on_event(&mut self, event: &CircuitEvent, circuit: &Circuit);
}

impl<F> CircuitObserver for F
where
    F: FnMut(&CircuitEvent, &Circuit),
{
    fn on_event(&mut self, event: &CircuitEvent, circuit: &Circuit) {
        self(event, circuit)
    }
}

/// Registered observers of a circuit.
#[derive(Default)]
pub(crate) struct ObserverList {
    entries: Vec<(ObserverId, Box<dyn CircuitObserver>)>,
    next_id: usize,
}

impl ObserverList {
    pub(crate) fn add(&mut self, observer: Box<dyn CircuitObserver>) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: ObserverId) -> Option<Box<dyn CircuitObserver>> {
        let pos = self.entries.iter().position(|(oid, _)| *oid == id)?;
        Some(self.entries.remove(pos).1)
    }
}

impl fmt::Debug for ObserverList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObserverList")
            .field("len", &self.entries.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchKind {
    Solved,
    Cleared,
}

/// Scoped guard for writing solved state onto a circuit.
///
/// Dropping the guard flushes a single notification. If the thread is
/// panicking the notification is suppressed, since the circuit may hold a
/// partially applied solution.
pub(crate) struct BatchUpdate<'a> {
    circuit: &'a mut Circuit,
    changes: Vec<BranchState>,
    kind: BatchKind,
}

impl<'a> BatchUpdate<'a> {
    pub(crate) fn new(circuit: &'a mut Circuit) -> Self {
        Self {
            circuit,
            changes: Vec::new(),
            kind: BatchKind::Solved,
        }
    }

    /// Mark this batch as a reset of a degenerate circuit.
    pub(crate) fn mark_cleared(&mut self) {
        self.kind = BatchKind::Cleared;
    }

    /// Write a branch's solved state.
    ///
    /// # Panics
    /// Panics if the branch is not in the circuit.
    pub(crate) fn set_branch(&mut self, id: BranchId, voltage_drop: f64, current: f64) {
        let branch = self
            .circuit
            .branch_mut(id)
            .unwrap_or_else(|| panic!("branch {} missing during batch update", id));
        if branch.voltage_drop() != voltage_drop || branch.current() != current {
            branch.set_solution(voltage_drop, current);
            self.changes.push(BranchState {
                branch: id,
                voltage_drop,
                current,
            });
        }
    }

    /// Write a junction's solved voltage.
    ///
    /// # Panics
    /// Panics if the junction is not in the circuit.
    pub(crate) fn set_junction_voltage(&mut self, id: JunctionId, voltage: f64) {
        self.circuit
            .junction_mut(id)
            .unwrap_or_else(|| panic!("junction {} missing during batch update", id))
            .set_voltage(voltage);
    }
}

impl Drop for BatchUpdate<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            return;
        }

        let changes = std::mem::take(&mut self.changes);
        let event = match self.kind {
            BatchKind::Solved => CircuitEvent::Solved { changes },
            BatchKind::Cleared => CircuitEvent::Cleared { changes },
        };

        let mut observers = std::mem::take(self.circuit.observers_mut());
        for (_, observer) in observers.entries.iter_mut() {
            observer.on_event(&event, &*self.circuit);
        }
        *self.circuit.observers_mut() = observers;
    }
}
