//! Error types for mesh construction.

use std::error::Error;
use std::fmt;

use crate::id::{ChipId, PinId, SegmentId};

/// Errors detected while collapsing a circuit into a simulation mesh.
///
/// All variants describe malformed topology and are fatal for the design
/// being generated: mesh generation aborts and returns the error rather
/// than producing a partial config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// A gating structure (edge, connector, or function binding) refers to
    /// a pin that no equivalence class was built for. This is the
    /// missing-endpoint construction error: an edge is never created with
    /// an absent endpoint or connector.
    UnboundPin {
        /// The pin with no mesh vertex.
        pin: PinId,
    },
    /// A wire segment endpoint names a chip that does not exist at the
    /// level the segment belongs to.
    DanglingEndpoint {
        /// The segment with the bad endpoint.
        segment: SegmentId,
        /// The chip the endpoint refers to.
        chip: ChipId,
    },
}

impl fmt::Display for MeshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnboundPin { pin } => {
                write!(f, "no mesh vertex exists for pin {pin}")
            }
            Self::DanglingEndpoint { segment, chip } => {
                write!(
                    f,
                    "wire segment {segment} references chip {chip} outside its design level"
                )
            }
        }
    }
}

impl Error for MeshError {}
