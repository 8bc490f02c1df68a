//! Constant source chips.
//!
//! The four classic flavors: a net can be *driven* high or low (an
//! active source), or merely *pulled* high or low (a weak default that
//! only wins when nothing drives the net).

use std::sync::Arc;

use weft_core::{BuiltinTemplate, ChipBehavior, ChipState, LogicState, Pin, PinId};

struct Source {
    driven: LogicState,
    pulled: LogicState,
    output: PinId,
}

impl ChipBehavior for Source {
    fn simulate(&self, state: &mut ChipState) {
        state.set_driven_output(self.output, self.driven);
        state.set_pulled_output(self.output, self.pulled);
    }
}

fn source(name: &str, driven_state: LogicState, pulled_state: LogicState) -> Arc<BuiltinTemplate> {
    let output = Pin::new("out");
    let behavior = Source {
        driven: driven_state,
        pulled: pulled_state,
        output: output.id(),
    };
    BuiltinTemplate::new(name, vec![], vec![output], Arc::new(behavior))
}

/// A source actively driving its output to `state` every tick.
pub fn driven(state: LogicState) -> Arc<BuiltinTemplate> {
    let name = match state {
        LogicState::High => "1",
        LogicState::Low => "0",
        _ => "driven",
    };
    source(name, state, LogicState::Unknown)
}

/// A source weakly pulling its output toward `state` every tick.
///
/// The pulled level only becomes the net's actual state when no active
/// driver touches the net during the tick.
pub fn pulled(state: LogicState) -> Arc<BuiltinTemplate> {
    let name = match state {
        LogicState::High => "(1)",
        LogicState::Low => "(0)",
        _ => "pulled",
    };
    source(name, LogicState::Unknown, state)
}
