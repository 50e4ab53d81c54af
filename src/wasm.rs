//! WASM bindings for CCK Core.
//!
//! This module provides JavaScript-friendly bindings so a browser front end
//! can edit a circuit and solve it on every animation frame.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { WasmCircuit } from 'cck_core';
//!
//! await init();
//!
//! const circuit = new WasmCircuit();
//! const neg = circuit.add_junction();
//! const pos = circuit.add_junction();
//! const battery = circuit.add_battery(neg, pos, 9.0);
//! const bulb = circuit.add_bulb(pos, neg);
//!
//! // In the animation loop:
//! circuit.solve();
//! const amps = circuit.branch_current(bulb);
//! ```

use wasm_bindgen::prelude::*;

use crate::circuit::{BranchId, Circuit, JunctionId};
use crate::error::CckError;
use crate::solver::{CircuitSolver, SolveOutcome, SolverConfig};

/// Initialize panic hook for better error messages in browser console.
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
}

fn js_err(err: CckError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// WASM-compatible circuit with its solver.
///
/// Junction and branch handles cross the boundary as plain integers.
#[wasm_bindgen]
pub struct WasmCircuit {
    circuit: Circuit,
    solver: CircuitSolver,
}

#[wasm_bindgen]
impl WasmCircuit {
    /// Create an empty circuit with the default solver configuration.
    #[wasm_bindgen(constructor)]
    pub fn new() -> WasmCircuit {
        WasmCircuit {
            circuit: Circuit::new(),
            solver: CircuitSolver::new(),
        }
    }

    /// Create an empty circuit with a custom resistance floor and pivot
    /// tolerance.
    #[wasm_bindgen]
    pub fn with_config(min_resistance: f64, pivot_tolerance: f64) -> Result<WasmCircuit, JsValue> {
        let config = SolverConfig::new()
            .with_min_resistance(min_resistance)
            .with_pivot_tolerance(pivot_tolerance);
        let solver = CircuitSolver::with_config(config).map_err(js_err)?;
        Ok(WasmCircuit {
            circuit: Circuit::new(),
            solver,
        })
    }

    #[wasm_bindgen]
    pub fn add_junction(&mut self) -> usize {
        self.circuit.add_junction().0
    }

    #[wasm_bindgen]
    pub fn add_resistor(
        &mut self,
        start: usize,
        end: usize,
        resistance: f64,
    ) -> Result<usize, JsValue> {
        self.circuit
            .add_resistor(JunctionId(start), JunctionId(end), resistance)
            .map(|id| id.0)
            .map_err(js_err)
    }

    #[wasm_bindgen]
    pub fn add_wire(&mut self, start: usize, end: usize) -> Result<usize, JsValue> {
        self.circuit
            .add_wire(JunctionId(start), JunctionId(end))
            .map(|id| id.0)
            .map_err(js_err)
    }

    #[wasm_bindgen]
    pub fn add_bulb(&mut self, start: usize, end: usize) -> Result<usize, JsValue> {
        self.circuit
            .add_bulb(JunctionId(start), JunctionId(end))
            .map(|id| id.0)
            .map_err(js_err)
    }

    /// Add a battery with its negative terminal on `start`.
    #[wasm_bindgen]
    pub fn add_battery(&mut self, start: usize, end: usize, emf: f64) -> Result<usize, JsValue> {
        self.circuit
            .add_battery(JunctionId(start), JunctionId(end), emf)
            .map(|id| id.0)
            .map_err(js_err)
    }

    #[wasm_bindgen]
    pub fn add_switch(&mut self, start: usize, end: usize, closed: bool) -> Result<usize, JsValue> {
        self.circuit
            .add_switch(JunctionId(start), JunctionId(end), closed)
            .map(|id| id.0)
            .map_err(js_err)
    }

    #[wasm_bindgen]
    pub fn remove_branch(&mut self, branch: usize) -> Result<(), JsValue> {
        self.circuit.remove_branch(BranchId(branch)).map(|_| ()).map_err(js_err)
    }

    #[wasm_bindgen]
    pub fn set_resistance(&mut self, branch: usize, resistance: f64) -> Result<(), JsValue> {
        self.circuit.set_resistance(BranchId(branch), resistance).map_err(js_err)
    }

    #[wasm_bindgen]
    pub fn set_emf(&mut self, branch: usize, emf: f64) -> Result<(), JsValue> {
        self.circuit.set_emf(BranchId(branch), emf).map_err(js_err)
    }

    #[wasm_bindgen]
    pub fn set_internal_resistance(
        &mut self,
        branch: usize,
        resistance: f64,
    ) -> Result<(), JsValue> {
        self.circuit
            .set_internal_resistance(BranchId(branch), resistance)
            .map_err(js_err)
    }

    #[wasm_bindgen]
    pub fn set_switch_closed(&mut self, branch: usize, closed: bool) -> Result<(), JsValue> {
        self.circuit.set_switch_closed(BranchId(branch), closed).map_err(js_err)
    }

    #[wasm_bindgen]
    pub fn reverse_branch(&mut self, branch: usize) -> Result<(), JsValue> {
        self.circuit.reverse_branch(BranchId(branch)).map_err(js_err)
    }

    /// Solve the circuit.
    ///
    /// # Returns
    /// `true` if a system was solved, `false` if the circuit was degenerate
    /// and its state was cleared. Throws on a singular system, leaving the
    /// previous values in place.
    #[wasm_bindgen]
    pub fn solve(&mut self) -> Result<bool, JsValue> {
        let report = self.solver.solve(&mut self.circuit).map_err(js_err)?;
        Ok(report.outcome == SolveOutcome::Solved)
    }

    /// Current through a branch from start to end, or `undefined`.
    #[wasm_bindgen]
    pub fn branch_current(&self, branch: usize) -> Option<f64> {
        self.circuit.branch(BranchId(branch)).map(|b| b.current())
    }

    /// `V(start) - V(end)` across a branch, or `undefined`.
    #[wasm_bindgen]
    pub fn branch_voltage_drop(&self, branch: usize) -> Option<f64> {
        self.circuit.branch(BranchId(branch)).map(|b| b.voltage_drop())
    }

    /// Power absorbed by a branch, or `undefined`.
    #[wasm_bindgen]
    pub fn branch_power(&self, branch: usize) -> Option<f64> {
        self.circuit.branch(BranchId(branch)).map(|b| b.power())
    }

    #[wasm_bindgen]
    pub fn junction_voltage(&self, junction: usize) -> Option<f64> {
        self.circuit.junction_voltage(JunctionId(junction))
    }

    /// Voltmeter reading between two junctions.
    #[wasm_bindgen]
    pub fn voltage_between(&self, positive: usize, negative: usize) -> Option<f64> {
        self.circuit
            .voltage_between(JunctionId(positive), JunctionId(negative))
    }

    /// Currents of all branches in insertion order.
    #[wasm_bindgen]
    pub fn currents(&self) -> Vec<f64> {
        self.circuit.branches().map(|b| b.current()).collect()
    }

    #[wasm_bindgen(getter)]
    pub fn branch_count(&self) -> usize {
        self.circuit.branch_count()
    }

    #[wasm_bindgen(getter)]
    pub fn junction_count(&self) -> usize {
        self.circuit.junction_count()
    }
}

impl Default for WasmCircuit {
    fn default() -> Self {
        Self::new()
    }
}

/// Get the library version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
