//! Control components: Switch.

/// A switch component.
///
/// - Closed: conducts with the solver's minimum resistance
/// - Open: not stamped at all, so it carries no current and does not
///   connect the junctions on either side
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Switch {
    pub closed: bool,
}

impl Switch {
    /// Create a new switch.
    pub fn new(closed: bool) -> Self {
        Self { closed }
    }

    /// Get the conductance used for stamping, or `None` when open.
    pub fn conductance(&self, min_resistance: f64) -> Option<f64> {
        self.closed.then(|| 1.0 / min_resistance)
    }

    /// Set the switch state.
    pub fn set_state(&mut self, closed: bool) {
        self.closed = closed;
    }
}
