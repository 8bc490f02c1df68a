//! The read-only query surface over a simulated circuit.

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;

use weft_core::{ChipId, LogicState, NodeId, PinId, SegmentId};

use crate::vertex::Vertex;

/// A tree mirroring the circuit's chip nesting, mapping each level's
/// pins, wire nodes, and wire segments to their mesh vertices.
///
/// All queries are backed by the rectified `actual` state of the mapped
/// vertex, so readers always observe a complete end-of-tick snapshot.
/// Elements with no mapping read as [`LogicState::Unconnected`].
#[derive(Debug, Default)]
pub struct SimulatedDesign {
    pub(crate) pins: IndexMap<PinId, Arc<Vertex>>,
    pub(crate) nodes: IndexMap<NodeId, Arc<Vertex>>,
    pub(crate) segments: IndexMap<SegmentId, Arc<Vertex>>,
    pub(crate) children: IndexMap<ChipId, Arc<SimulatedDesign>>,
}

impl SimulatedDesign {
    /// The shared all-unconnected blank design, returned for chips with
    /// no simulated sub-design.
    pub fn blank() -> Arc<Self> {
        static BLANK: OnceLock<Arc<SimulatedDesign>> = OnceLock::new();
        BLANK.get_or_init(|| Arc::new(Self::default())).clone()
    }

    /// The simulated state of a pin at this level.
    pub fn state_for_pin(&self, pin: PinId) -> LogicState {
        self.pins
            .get(&pin)
            .map(|vertex| vertex.actual())
            .unwrap_or(LogicState::Unconnected)
    }

    /// The simulated state of a wire node at this level.
    pub fn state_for_node(&self, node: NodeId) -> LogicState {
        self.nodes
            .get(&node)
            .map(|vertex| vertex.actual())
            .unwrap_or(LogicState::Unconnected)
    }

    /// The simulated state of a wire segment at this level.
    pub fn state_for_segment(&self, segment: SegmentId) -> LogicState {
        self.segments
            .get(&segment)
            .map(|vertex| vertex.actual())
            .unwrap_or(LogicState::Unconnected)
    }

    /// The simulated design nested inside a chip at this level, or the
    /// blank design if the chip has none.
    pub fn child_design(&self, chip: ChipId) -> Arc<SimulatedDesign> {
        self.children
            .get(&chip)
            .cloned()
            .unwrap_or_else(Self::blank)
    }

    /// The mesh vertex behind a pin at this level, if any.
    pub fn vertex_for_pin(&self, pin: PinId) -> Option<&Arc<Vertex>> {
        self.pins.get(&pin)
    }
}
