//! A manually operated switch chip.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use weft_core::{BuiltinTemplate, ChipBehavior, ChipState, LogicState, Pin, PinId};

/// The flippable state of a [`toggle`] chip.
///
/// Drives its output high while on and low while off. Flipping takes
/// effect at the next tick that samples it; the simulation itself never
/// writes the switch position.
pub struct Toggle {
    on: AtomicBool,
    output: PinId,
}

impl Toggle {
    /// Whether the switch is currently on.
    pub fn is_on(&self) -> bool {
        self.on.load(Ordering::Acquire)
    }

    /// Set the switch position.
    pub fn set(&self, on: bool) {
        self.on.store(on, Ordering::Release);
    }

    /// Invert the switch position.
    pub fn flip(&self) {
        self.on.fetch_xor(true, Ordering::AcqRel);
    }
}

impl ChipBehavior for Toggle {
    fn simulate(&self, state: &mut ChipState) {
        let level = if self.is_on() {
            LogicState::High
        } else {
            LogicState::Low
        };
        state.set_driven_output(self.output, level);
    }
}

/// A switch chip with one output pin, off by default.
///
/// Returns the template together with the shared [`Toggle`] handle used
/// to operate the switch from outside the simulation.
pub fn toggle() -> (Arc<BuiltinTemplate>, Arc<Toggle>) {
    let output = Pin::new("out");
    let handle = Arc::new(Toggle {
        on: AtomicBool::new(false),
        output: output.id(),
    });
    let template = BuiltinTemplate::new("toggle", vec![], vec![output], handle.clone());
    (template, handle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_drives_its_position() {
        let (template, handle) = toggle();
        let out = template.output_pins()[0].id();
        let mut state = ChipState::new();

        template.behavior().simulate(&mut state);
        assert_eq!(state.driven_output(out), LogicState::Low);

        handle.set(true);
        template.behavior().simulate(&mut state);
        assert_eq!(state.driven_output(out), LogicState::High);

        handle.flip();
        assert!(!handle.is_on());
    }
}
