//! Resistive components: resistors, wires and bulbs.

use crate::error::{CckError, Result};

/// Default resistance of a freshly placed wire (ohms).
pub const DEFAULT_WIRE_RESISTANCE: f64 = 1e-4;

/// Default resistance of a light bulb filament (ohms).
pub const DEFAULT_BULB_RESISTANCE: f64 = 10.0;

/// What a resistive element looks like to the user.
///
/// The tag is informational; every kind stamps as a plain conductance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResistiveKind {
    #[default]
    Resistor,
    Wire,
    Bulb,
}

impl ResistiveKind {
    pub fn name(&self) -> &'static str {
        match self {
            ResistiveKind::Resistor => "resistor",
            ResistiveKind::Wire => "wire",
            ResistiveKind::Bulb => "bulb",
        }
    }
}

/// A resistive two-terminal element.
#[derive(Debug, Clone, PartialEq)]
pub struct Resistor {
    /// Resistance in ohms, always finite and > 0
    resistance: f64,
    pub kind: ResistiveKind,
}

impl Resistor {
    /// Create a new resistor.
    pub fn new(resistance: f64) -> Result<Self> {
        Self::with_kind(resistance, ResistiveKind::Resistor)
    }

    /// Create a resistive element of the given kind.
    pub fn with_kind(resistance: f64, kind: ResistiveKind) -> Result<Self> {
        validate_resistance(resistance)?;
        Ok(Self { resistance, kind })
    }

    /// A wire with the default (near zero) resistance.
    pub fn wire() -> Self {
        Self {
            resistance: DEFAULT_WIRE_RESISTANCE,
            kind: ResistiveKind::Wire,
        }
    }

    /// A light bulb with the default filament resistance.
    pub fn bulb() -> Self {
        Self {
            resistance: DEFAULT_BULB_RESISTANCE,
            kind: ResistiveKind::Bulb,
        }
    }

    /// Stored resistance (ohms).
    pub fn resistance(&self) -> f64 {
        self.resistance
    }

    /// Set the resistance, rejecting non-positive and non-finite values.
    pub fn set_resistance(&mut self, resistance: f64) -> Result<()> {
        validate_resistance(resistance)?;
        self.resistance = resistance;
        Ok(())
    }

    /// Resistance used for stamping, clamped to `min_resistance`.
    pub fn effective_resistance(&self, min_resistance: f64) -> f64 {
        self.resistance.max(min_resistance)
    }

    /// Get the conductance (1/R) using the effective resistance.
    pub fn conductance(&self, min_resistance: f64) -> f64 {
        1.0 / self.effective_resistance(min_resistance)
    }
}

#[cfg(test)]
impl Resistor {
    /// Build a resistor without validating its value.
    pub(crate) fn new_unchecked(resistance: f64) -> Self {
        Self {
            resistance,
            kind: ResistiveKind::Resistor,
        }
    }
}

pub(crate) fn validate_resistance(resistance: f64) -> Result<()> {
    if resistance.is_finite() && resistance > 0.0 {
        Ok(())
    } else {
        Err(CckError::InvalidResistance { value: resistance })
    }
}
