//! Logic states and per-chip simulation state.

use std::fmt;

use indexmap::IndexMap;

use crate::id::PinId;

/// A simulated digital logic state for circuit elements.
///
/// `Low` and `High` are *exclusive*: they describe a net actively driven
/// to a level, and two differing exclusive states applied to the same net
/// short it into [`LogicState::Conflicted`]. The remaining states are
/// non-exclusive and can be freely overwritten by a driven level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum LogicState {
    /// The "low" logic state (a binary 0).
    Low,
    /// The "high" logic state (a binary 1).
    High,
    /// A floating / high-impedance net with no driver.
    #[default]
    Unconnected,
    /// A net driven by two conflicting exclusive signals.
    Conflicted,
    /// No information about the state; never overwrites another state.
    Unknown,
}

impl LogicState {
    /// Whether this state is *exclusive* (an actively driven level).
    ///
    /// A net already holding an exclusive state enters
    /// [`LogicState::Conflicted`] when a *different* exclusive state is
    /// applied to it. Non-exclusive states (such as
    /// [`LogicState::Unconnected`]) are simply overwritten.
    pub fn is_exclusive(self) -> bool {
        matches!(self, Self::Low | Self::High)
    }
}

impl fmt::Display for LogicState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::High => "high",
            Self::Unconnected => "unconnected",
            Self::Conflicted => "conflicted",
            Self::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Mutable per-chip-instance scratch state exchanged with a chip's
/// [`ChipBehavior`](crate::behavior::ChipBehavior) each tick.
///
/// Holds four pin-keyed maps: driven and pulled levels, separately for
/// inputs and outputs. Absent entries read as [`LogicState::Unknown`].
/// One `ChipState` lives per chip instance and persists across ticks
/// (it is never reallocated), so behaviors may keep internal state in it
/// — a latch can read back the outputs it wrote last tick.
#[derive(Debug, Default)]
pub struct ChipState {
    driven_inputs: IndexMap<PinId, LogicState>,
    pulled_inputs: IndexMap<PinId, LogicState>,
    driven_outputs: IndexMap<PinId, LogicState>,
    pulled_outputs: IndexMap<PinId, LogicState>,
}

impl ChipState {
    /// Create an empty chip state; every pin reads as
    /// [`LogicState::Unknown`].
    pub fn new() -> Self {
        Self::default()
    }

    /// The driven (actively sourced) level observed on an input pin.
    pub fn driven_input(&self, pin: PinId) -> LogicState {
        self.driven_inputs
            .get(&pin)
            .copied()
            .unwrap_or(LogicState::Unknown)
    }

    /// Record the driven level observed on an input pin.
    pub fn set_driven_input(&mut self, pin: PinId, state: LogicState) {
        self.driven_inputs.insert(pin, state);
    }

    /// The pulled (weak default) level observed on an input pin.
    pub fn pulled_input(&self, pin: PinId) -> LogicState {
        self.pulled_inputs
            .get(&pin)
            .copied()
            .unwrap_or(LogicState::Unknown)
    }

    /// Record the pulled level observed on an input pin.
    pub fn set_pulled_input(&mut self, pin: PinId, state: LogicState) {
        self.pulled_inputs.insert(pin, state);
    }

    /// The driven level this chip wants to apply to an output pin.
    pub fn driven_output(&self, pin: PinId) -> LogicState {
        self.driven_outputs
            .get(&pin)
            .copied()
            .unwrap_or(LogicState::Unknown)
    }

    /// Set the driven level this chip applies to an output pin.
    pub fn set_driven_output(&mut self, pin: PinId, state: LogicState) {
        self.driven_outputs.insert(pin, state);
    }

    /// The pulled level this chip wants to apply to an output pin.
    pub fn pulled_output(&self, pin: PinId) -> LogicState {
        self.pulled_outputs
            .get(&pin)
            .copied()
            .unwrap_or(LogicState::Unknown)
    }

    /// Set the pulled level this chip applies to an output pin.
    pub fn set_pulled_output(&mut self, pin: PinId, state: LogicState) {
        self.pulled_outputs.insert(pin, state);
    }
}
