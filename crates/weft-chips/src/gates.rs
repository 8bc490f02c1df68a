//! Two-input logic gates.
//!
//! Gates read the driven level of their inputs and treat anything other
//! than a definite high as low — an unconnected or conflicted input does
//! not poison the output, it simply fails to assert.

use std::sync::Arc;

use weft_core::{BuiltinTemplate, ChipBehavior, ChipState, LogicState, Pin, PinId};

struct Gate {
    inputs: [PinId; 2],
    output: PinId,
    /// Truth function over (a_high, b_high).
    truth: fn(bool, bool) -> bool,
}

impl ChipBehavior for Gate {
    fn simulate(&self, state: &mut ChipState) {
        let a = state.driven_input(self.inputs[0]) == LogicState::High;
        let b = state.driven_input(self.inputs[1]) == LogicState::High;
        let level = if (self.truth)(a, b) {
            LogicState::High
        } else {
            LogicState::Low
        };
        state.set_driven_output(self.output, level);
    }
}

fn gate(name: &str, truth: fn(bool, bool) -> bool) -> Arc<BuiltinTemplate> {
    let a = Pin::new("a");
    let b = Pin::new("b");
    let out = Pin::new("out");
    let behavior = Gate {
        inputs: [a.id(), b.id()],
        output: out.id(),
        truth,
    };
    BuiltinTemplate::new(name, vec![a, b], vec![out], Arc::new(behavior))
}

/// A two-input NOR gate.
pub fn nor() -> Arc<BuiltinTemplate> {
    gate("nor", |a, b| !(a || b))
}

/// A two-input NAND gate.
pub fn nand() -> Arc<BuiltinTemplate> {
    gate("nand", |a, b| !(a && b))
}
