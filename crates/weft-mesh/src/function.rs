//! A simulated chip's binding to its pins' vertices.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use tracing::error;

use weft_core::{BuiltinTemplate, ChipId, ChipState, PinId};

use crate::sync::lock;
use crate::vertex::{StateChange, StateUpdate, Vertex};

/// Binds one built-in chip instance to the vertices of its input and
/// output pins, together with the chip's persistent [`ChipState`].
///
/// Each tick, [`Function::tick`] copies the input vertices' committed
/// state into the chip state, invokes the template's behavior, and
/// compares the resulting output levels against the vertices'
/// in-progress state to decide what needs to propagate.
pub struct Function {
    chip: ChipId,
    label: String,
    template: Arc<BuiltinTemplate>,
    inputs: Vec<(PinId, Arc<Vertex>)>,
    outputs: Vec<(PinId, Arc<Vertex>)>,
    state: Mutex<ChipState>,
}

impl Function {
    /// Bind a chip instance to its resolved pin vertices.
    pub fn new(
        chip: ChipId,
        label: impl Into<String>,
        template: Arc<BuiltinTemplate>,
        inputs: Vec<(PinId, Arc<Vertex>)>,
        outputs: Vec<(PinId, Arc<Vertex>)>,
    ) -> Self {
        Self {
            chip,
            label: label.into(),
            template,
            inputs,
            outputs,
            state: Mutex::new(ChipState::new()),
        }
    }

    /// The bound chip instance's ID.
    pub fn chip(&self) -> ChipId {
        self.chip
    }

    /// Run one compute step for this chip.
    ///
    /// Output vertices whose desired state differs from their current
    /// in-progress state are pushed onto `updates` for the propagate
    /// phase. Returns `true` when anything was queued.
    ///
    /// A panicking behavior is contained here: the failure is logged
    /// with the chip's identity, every output vertex is marked
    /// conflicted (fail safe rather than fail silent), and the tick goes
    /// on without this chip.
    pub fn tick(&self, updates: &mut Vec<StateUpdate>) -> bool {
        let mut state = lock(&self.state);

        for (pin, vertex) in &self.inputs {
            state.set_driven_input(*pin, vertex.actual());
            state.set_pulled_input(*pin, vertex.suggested());
        }

        let outcome = catch_unwind(AssertUnwindSafe(|| {
            self.template.behavior().simulate(&mut state);
        }));
        if outcome.is_err() {
            error!(
                chip = %self.chip,
                name = %self.label,
                "chip behavior panicked; marking its output nets conflicted"
            );
            for (_, vertex) in &self.outputs {
                vertex.mark_conflicted();
            }
            // Report a change so the tick rectifies the conflict.
            return true;
        }

        let mut changed = false;
        for (pin, vertex) in &self.outputs {
            let desired = StateChange {
                actual: state.driven_output(*pin),
                suggested: state.pulled_output(*pin),
            };
            if vertex.compare(desired) {
                updates.push(StateUpdate {
                    vertex: vertex.clone(),
                    change: desired,
                });
                changed = true;
            }
        }
        changed
    }
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("chip", &self.chip)
            .field("name", &self.label)
            .finish_non_exhaustive()
    }
}
