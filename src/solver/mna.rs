//! MNA matrix storage, stamping primitives and dense LU solving.

use crate::error::{CckError, Result};

use super::DEFAULT_PIVOT_TOLERANCE;

/// MNA matrix system Ax = z.
#[derive(Debug, Clone)]
pub struct MnaMatrix {
    /// System matrix A (row-major)
    pub a: Vec<f64>,
    /// Source vector z
    pub z: Vec<f64>,
    /// Solution vector x
    pub x: Vec<f64>,
    /// Matrix dimension
    pub size: usize,
    /// LU decomposition of the row-scaled A
    lu: Vec<f64>,
    /// Pivot indices for LU decomposition
    pivots: Vec<usize>,
    /// Power-of-two factor applied to each row of A before factoring
    row_scale: Vec<f64>,
    /// Pivot threshold relative to the largest entry of the scaled A
    pivot_tolerance: f64,
    /// Absolute pivot threshold computed by the last factorization
    singular_threshold: f64,
}

impl MnaMatrix {
    /// Create a zeroed system of the given dimension.
    pub fn new(size: usize) -> Self {
        Self {
            a: vec![0.0; size * size],
            z: vec![0.0; size],
            x: vec![0.0; size],
            size,
            lu: vec![0.0; size * size],
            pivots: vec![0; size],
            row_scale: vec![1.0; size],
            pivot_tolerance: DEFAULT_PIVOT_TOLERANCE,
            singular_threshold: 0.0,
        }
    }

    /// Set the relative zero-pivot tolerance.
    pub fn with_pivot_tolerance(mut self, tolerance: f64) -> Self {
        self.pivot_tolerance = tolerance;
        self
    }

    /// Get matrix element at (row, col).
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.a[row * self.size + col]
    }

    /// Add to matrix element at (row, col).
    pub fn add(&mut self, row: usize, col: usize, value: f64) {
        self.a[row * self.size + col] += value;
    }

    /// Stamp a conductance between two nodes.
    /// For a conductance G between nodes n1 and n2:
    ///   A[n1,n1] += G
    ///   A[n2,n2] += G
    ///   A[n1,n2] -= G
    ///   A[n2,n1] -= G
    ///
    /// `None` is a reference node and is skipped.
    pub fn stamp_conductance(&mut self, n1: Option<usize>, n2: Option<usize>, g: f64) {
        if let Some(i) = n1 {
            self.add(i, i, g);
        }
        if let Some(j) = n2 {
            self.add(j, j, g);
        }
        if let (Some(i), Some(j)) = (n1, n2) {
            self.add(i, j, -g);
            self.add(j, i, -g);
        }
    }

    /// Stamp a battery from `n_neg` to `n_pos` with its source current at
    /// row/column `br`.
    ///
    /// The source current flows through the battery from `n_neg` to `n_pos`:
    /// it leaves `n_neg` and enters `n_pos`. The constraint row enforces
    ///   V[n_pos] - V[n_neg] + r * I = E
    pub fn stamp_battery(
        &mut self,
        n_neg: Option<usize>,
        n_pos: Option<usize>,
        br: usize,
        emf: f64,
        internal_resistance: f64,
    ) {
        if let Some(i) = n_neg {
            self.add(i, br, 1.0);
            self.add(br, i, -1.0);
        }
        if let Some(j) = n_pos {
            self.add(j, br, -1.0);
            self.add(br, j, 1.0);
        }
        self.add(br, br, internal_resistance);
        self.z[br] = emf;
    }

    /// Copy A into the LU buffer with every row scaled by a power of two
    /// so its largest entry lies in [0.5, 1).
    ///
    /// KCL rows hold siemens while battery rows hold ohms and unit
    /// coefficients; equilibrating puts them on one scale. Powers of two
    /// scale exactly, so no rounding is introduced.
    fn equilibrate(&mut self) -> Result<()> {
        let n = self.size;
        for i in 0..n {
            let row = &self.a[i * n..(i + 1) * n];
            let max = row.iter().fold(0.0f64, |m, v| m.max(v.abs()));
            if !max.is_finite() || max == 0.0 {
                return Err(CckError::SingularMatrix);
            }
            let scale = 2f64.powi(-(max.log2().floor() as i32) - 1);
            self.row_scale[i] = scale;
            for j in 0..n {
                self.lu[i * n + j] = row[j] * scale;
            }
        }
        Ok(())
    }

    /// Perform LU decomposition with partial pivoting.
    ///
    /// Rows are equilibrated first, and a pivot is treated as zero when its
    /// magnitude does not exceed the relative tolerance times the largest
    /// scaled entry. Detection therefore does not depend on the units or
    /// magnitudes of the elements in the circuit.
    pub fn factor(&mut self) -> Result<()> {
        let n = self.size;
        for i in 0..n {
            self.pivots[i] = i;
        }
        if n == 0 {
            return Ok(());
        }

        self.equilibrate()?;
        let scale = self.lu.iter().fold(0.0f64, |m, v| m.max(v.abs()));
        self.singular_threshold = self.pivot_tolerance * scale;

        for k in 0..n {
            // Find pivot
            let mut max_val = self.lu[k * n + k].abs();
            let mut max_row = k;

            for i in (k + 1)..n {
                let val = self.lu[i * n + k].abs();
                if val > max_val {
                    max_val = val;
                    max_row = i;
                }
            }

            if max_val <= self.singular_threshold {
                return Err(CckError::SingularMatrix);
            }

            // Swap rows if needed
            if max_row != k {
                self.pivots.swap(k, max_row);
                for j in 0..n {
                    self.lu.swap(k * n + j, max_row * n + j);
                }
            }

            // Eliminate
            let pivot = self.lu[k * n + k];
            for i in (k + 1)..n {
                let factor = self.lu[i * n + k] / pivot;
                self.lu[i * n + k] = factor;
                for j in (k + 1)..n {
                    self.lu[i * n + j] -= factor * self.lu[k * n + j];
                }
            }
        }

        Ok(())
    }

    /// Solve the system using the pre-computed LU decomposition.
    pub fn solve(&mut self) -> Result<()> {
        let n = self.size;

        // Apply row scaling and pivot permutation to z
        for i in 0..n {
            let row = self.pivots[i];
            self.x[i] = self.z[row] * self.row_scale[row];
        }

        // Forward substitution (L * y = Pb)
        for i in 0..n {
            for j in 0..i {
                self.x[i] -= self.lu[i * n + j] * self.x[j];
            }
        }

        // Back substitution (U * x = y)
        for i in (0..n).rev() {
            for j in (i + 1)..n {
                self.x[i] -= self.lu[i * n + j] * self.x[j];
            }
            let diag = self.lu[i * n + i];
            if diag.abs() <= self.singular_threshold {
                return Err(CckError::SingularMatrix);
            }
            self.x[i] /= diag;
        }

        if let Some((index, &value)) = self.x.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(CckError::NumericalOverflow { index, value });
        }

        Ok(())
    }

    /// Factor and solve in one step.
    pub fn factor_and_solve(&mut self) -> Result<&[f64]> {
        self.factor()?;
        self.solve()?;
        Ok(&self.x)
    }
}
