//! A meshed logic-circuit simulation engine.
//!
//! Weft simulates digital circuits built from hierarchically nested
//! chips — primitive transistors, built-in logic functions, and
//! user-composed sub-circuits — connected by wires. The wiring topology
//! is collapsed into electrically-equivalent nets ("mesh generation"),
//! which a concurrent, barrier-synchronized tick loop then drives
//! through time, resolving drive conflicts, modeling transistor
//! switching delay, and propagating state changes.
//!
//! This crate re-exports the whole workspace:
//!
//! - [`core`] — logic states, the circuit model, chip behaviors
//! - [`chips`] — built-in sources, switches, and gates
//! - [`mesh`] — mesh generation and the vertex state model
//! - [`engine`] — the tick coordinator, timer, and lifecycle facade

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub use weft_chips as chips;
pub use weft_core as core;
pub use weft_engine as engine;
pub use weft_mesh as mesh;

pub use weft_core::{ChipState, Design, LogicState};
pub use weft_engine::{EngineConfig, Simulation};
pub use weft_mesh::SimulatedDesign;

#[cfg(test)]
mod tests {
    #[test]
    fn facade_types_are_reachable() {
        let config = crate::EngineConfig::default();
        assert!(config.validate().is_ok());
    }
}
