//! Main solver interface.

use crate::circuit::{validate_circuit, Circuit, Topology};
use crate::error::{CckError, Result};

use super::apply::{apply_cleared, apply_solution};
use super::assemble::assemble;
use super::solution::Solution;
use super::{DEFAULT_MIN_RESISTANCE, DEFAULT_PIVOT_TOLERANCE, MIN_SOLVABLE_BRANCHES};

/// Configuration for the solver.
#[derive(Debug, Clone, PartialEq)]
pub struct SolverConfig {
    /// Resistance floor applied when stamping (ohms).
    pub min_resistance: f64,
    /// Zero-pivot threshold relative to the largest entry after row
    /// equilibration.
    pub pivot_tolerance: f64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            min_resistance: DEFAULT_MIN_RESISTANCE,
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the resistance floor (in ohms).
    ///
    /// Wires and closed switches sit at or near this value. Lower floors
    /// allow larger short-circuit currents but worsen conditioning.
    pub fn with_min_resistance(mut self, min_resistance: f64) -> Self {
        self.min_resistance = min_resistance;
        self
    }

    /// Set the relative zero-pivot tolerance.
    pub fn with_pivot_tolerance(mut self, pivot_tolerance: f64) -> Self {
        self.pivot_tolerance = pivot_tolerance;
        self
    }

    /// Check that both values are finite and in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.min_resistance.is_finite() && self.min_resistance > 0.0) {
            return Err(CckError::invalid_config(format!(
                "min_resistance must be finite and positive, got {}",
                self.min_resistance
            )));
        }
        let tol = self.pivot_tolerance;
        if !(tol.is_finite() && tol > 0.0 && tol < 1.0) {
            return Err(CckError::invalid_config(format!(
                "pivot_tolerance must be in (0, 1), got {}",
                self.pivot_tolerance
            )));
        }
        Ok(())
    }
}

/// What a solve pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveOutcome {
    /// Fewer than two branches; all solved state was reset to zero.
    Degenerate,
    /// The MNA system was solved and applied.
    Solved,
}

/// Summary of one solve pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolveReport {
    pub outcome: SolveOutcome,
    /// Dimension of the MNA system (0 when degenerate)
    pub unknowns: usize,
    /// Number of batteries stamped
    pub sources: usize,
    /// Connected components, each grounded separately
    pub components: usize,
}

impl SolveReport {
    fn degenerate() -> Self {
        Self {
            outcome: SolveOutcome::Degenerate,
            unknowns: 0,
            sources: 0,
            components: 0,
        }
    }
}

/// Solves circuits once per clock tick.
///
/// Each call rebuilds the MNA system from scratch; nothing is carried over
/// between ticks.
#[derive(Debug, Clone, Default)]
pub struct CircuitSolver {
    config: SolverConfig,
}

impl CircuitSolver {
    /// Create a solver with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a solver with custom configuration.
    pub fn with_config(config: SolverConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Compute a solution without touching the circuit.
    ///
    /// Returns `None` for degenerate circuits.
    pub fn analyze(&self, circuit: &Circuit) -> Result<Option<(Topology, Solution)>> {
        if circuit.branch_count() < MIN_SOLVABLE_BRANCHES {
            return Ok(None);
        }

        debug_assert!(
            validate_circuit(circuit).is_ok(),
            "inconsistent circuit: {:?}",
            validate_circuit(circuit)
        );

        let topology = Topology::new(circuit);
        let mut system = assemble(circuit, &topology, &self.config);
        log::debug!(
            "Solving {} unknowns ({} junctions, {} branches, {} batteries, {} components)",
            system.layout.size(),
            topology.junction_count(),
            topology.branch_count(),
            system.layout.num_sources(),
            topology.component_count()
        );

        let x = system.matrix.factor_and_solve()?;
        let solution = Solution::from_unknowns(&system.layout, topology.junction_count(), x);
        Ok(Some((topology, solution)))
    }

    /// Solve the circuit and write voltages and currents onto it.
    ///
    /// On failure the circuit keeps the state from the last successful
    /// solve and no observer is notified.
    pub fn solve(&self, circuit: &mut Circuit) -> Result<SolveReport> {
        let analyzed = match self.analyze(circuit) {
            Ok(analyzed) => analyzed,
            Err(err) => {
                log::warn!("Circuit solve failed, keeping previous state: {}", err);
                return Err(err);
            }
        };

        let Some((topology, solution)) = analyzed else {
            log::debug!("Degenerate circuit ({} branches), clearing", circuit.branch_count());
            apply_cleared(circuit);
            return Ok(SolveReport::degenerate());
        };

        let report = SolveReport {
            outcome: SolveOutcome::Solved,
            unknowns: topology.junction_count() - topology.component_count()
                + solution.source_currents().len(),
            sources: solution.source_currents().len(),
            components: topology.component_count(),
        };

        apply_solution(circuit, &topology, &solution, self.config.min_resistance);
        Ok(report)
    }
}

/// Solve a circuit with the default configuration.
pub fn solve(circuit: &mut Circuit) -> Result<SolveReport> {
    CircuitSolver::new().solve(circuit)
}
