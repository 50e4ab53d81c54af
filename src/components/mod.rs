//! Component models for circuit branches.
//!
//! This module provides the payloads a branch can carry:
//! - Resistive: Resistor, Wire, Bulb (all stamp as a conductance)
//! - Sources: Battery (adds a source-current unknown)
//! - Controls: Switch
//!
//! The assembler dispatches on [`Component`] with an exhaustive `match`,
//! so a new variant cannot be silently stamped as something else.

mod controls;
mod linear;
mod sources;

pub use controls::Switch;
pub use linear::{ResistiveKind, Resistor, DEFAULT_BULB_RESISTANCE, DEFAULT_WIRE_RESISTANCE};
pub use sources::Battery;

pub(crate) use linear::validate_resistance;

/// The element a branch carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Resistor(Resistor),
    Battery(Battery),
    Switch(Switch),
}

impl Component {
    /// Short human-readable name of the component type.
    pub fn type_name(&self) -> &'static str {
        match self {
            Component::Resistor(r) => r.kind.name(),
            Component::Battery(_) => "battery",
            Component::Switch(_) => "switch",
        }
    }

    /// Whether this component allocates a source-current unknown.
    pub fn is_source(&self) -> bool {
        matches!(self, Component::Battery(_))
    }

    /// Whether this component electrically connects its two junctions.
    ///
    /// Open switches are the only non-conducting element.
    pub fn is_conducting(&self) -> bool {
        match self {
            Component::Resistor(_) | Component::Battery(_) => true,
            Component::Switch(s) => s.closed,
        }
    }

    /// Resistance as seen by the stamping rules, if the element is resistive.
    pub fn effective_resistance(&self, min_resistance: f64) -> Option<f64> {
        match self {
            Component::Resistor(r) => Some(r.effective_resistance(min_resistance)),
            Component::Switch(s) if s.closed => Some(min_resistance),
            Component::Switch(_) | Component::Battery(_) => None,
        }
    }
}

impl From<Resistor> for Component {
    fn from(r: Resistor) -> Self {
        Component::Resistor(r)
    }
}

impl From<Battery> for Component {
    fn from(b: Battery) -> Self {
        Component::Battery(b)
    }
}

impl From<Switch> for Component {
    fn from(s: Switch) -> Self {
        Component::Switch(s)
    }
}
