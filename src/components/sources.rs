//! Batteries.

use crate::error::{CckError, Result};

/// A battery: an ideal voltage source in series with an internal resistance.
///
/// The branch's `start` junction is the negative terminal and `end` the
/// positive terminal. Each battery adds one source-current unknown to the
/// MNA system and enforces:
///
/// ```text
/// V(end) - V(start) = EMF - r * I
/// ```
///
/// where `I` flows through the battery from `start` to `end`.
#[derive(Debug, Clone, PartialEq)]
pub struct Battery {
    emf: f64,
    internal_resistance: f64,
}

impl Battery {
    /// Create an ideal battery.
    pub fn new(emf: f64) -> Result<Self> {
        Self::with_internal_resistance(emf, 0.0)
    }

    /// Create a battery with internal resistance.
    pub fn with_internal_resistance(emf: f64, internal_resistance: f64) -> Result<Self> {
        validate_emf(emf)?;
        validate_internal_resistance(internal_resistance)?;
        Ok(Self {
            emf,
            internal_resistance,
        })
    }

    /// Electromotive force (volts).
    pub fn emf(&self) -> f64 {
        self.emf
    }

    /// Internal resistance (ohms). Zero means an ideal source.
    pub fn internal_resistance(&self) -> f64 {
        self.internal_resistance
    }

    pub fn set_emf(&mut self, emf: f64) -> Result<()> {
        validate_emf(emf)?;
        self.emf = emf;
        Ok(())
    }

    pub fn set_internal_resistance(&mut self, internal_resistance: f64) -> Result<()> {
        validate_internal_resistance(internal_resistance)?;
        self.internal_resistance = internal_resistance;
        Ok(())
    }

    /// Terminal voltage `V(end) - V(start)` while delivering `current`.
    pub fn terminal_voltage(&self, current: f64) -> f64 {
        self.emf - self.internal_resistance * current
    }
}

fn validate_emf(emf: f64) -> Result<()> {
    if emf.is_finite() && emf >= 0.0 {
        Ok(())
    } else {
        Err(CckError::InvalidEmf { value: emf })
    }
}

fn validate_internal_resistance(r: f64) -> Result<()> {
    if r.is_finite() && r >= 0.0 {
        Ok(())
    } else {
        Err(CckError::InvalidInternalResistance { value: r })
    }
}
