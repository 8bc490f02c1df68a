//! Core types for the weft logic-circuit simulation engine.
//!
//! This is the leaf crate with zero internal dependencies. It defines
//! the fundamental abstractions shared by the rest of the workspace:
//! logic states, typed IDs, the read-only circuit model (designs, chips,
//! pins, wires, templates), the chip behavior trait, and error types.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod behavior;
pub mod circuit;
pub mod error;
pub mod id;
pub mod state;

pub use behavior::ChipBehavior;
pub use circuit::{
    BuiltinTemplate, Chip, ChipTemplate, Design, Pin, TransistorTemplate, WireEnd, WireNode,
    WireSegment,
};
pub use error::MeshError;
pub use id::{ChipId, NodeId, PinId, SegmentId, VertexId};
pub use state::{ChipState, LogicState};
