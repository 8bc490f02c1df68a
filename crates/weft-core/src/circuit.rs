//! The read-only circuit model consumed by mesh generation.
//!
//! A [`Design`] is a flat description of one level of a circuit: its
//! boundary pins, the chip instances placed in it, and the wire nodes and
//! segments connecting them. Chips carry a [`ChipTemplate`], a closed sum
//! over the three kinds of chip the engine knows how to simulate:
//! transistors, built-in simulated chips, and composite chips nesting
//! another design.
//!
//! The simulation engine never mutates a design; it walks it once during
//! mesh generation and thereafter only queries the derived structures.

use std::sync::Arc;

use indexmap::IndexMap;

use crate::behavior::ChipBehavior;
use crate::id::{ChipId, NodeId, PinId, SegmentId};

/// A connection point on a design boundary or chip template.
#[derive(Clone, Debug)]
pub struct Pin {
    id: PinId,
    name: String,
}

impl Pin {
    /// Create a pin with a fresh unique ID.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: PinId::next(),
            name: name.into(),
        }
    }

    /// The pin's unique ID.
    pub fn id(&self) -> PinId {
        self.id
    }

    /// The pin's display name.
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A junction point in a design's wiring, joining several segments.
#[derive(Clone, Debug)]
pub struct WireNode {
    id: NodeId,
}

impl WireNode {
    /// The node's unique ID.
    pub fn id(&self) -> NodeId {
        self.id
    }
}

/// One endpoint of a wire segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WireEnd {
    /// A pin, either on a chip at this design level (`chip` set) or on
    /// the design boundary itself (`chip` absent).
    Pin {
        /// The chip the pin belongs to; `None` for a design-level pin.
        chip: Option<ChipId>,
        /// The pin itself.
        pin: PinId,
    },
    /// A wire node at this design level.
    Node(NodeId),
}

impl WireEnd {
    /// Endpoint at a design-boundary pin.
    pub fn design_pin(pin: PinId) -> Self {
        Self::Pin { chip: None, pin }
    }

    /// Endpoint at a pin of a chip placed in this design.
    pub fn chip_pin(chip: ChipId, pin: PinId) -> Self {
        Self::Pin {
            chip: Some(chip),
            pin,
        }
    }

    /// Endpoint at a wire node.
    pub fn node(node: NodeId) -> Self {
        Self::Node(node)
    }
}

/// A wire segment between two endpoints (pins or nodes).
#[derive(Clone, Debug)]
pub struct WireSegment {
    id: SegmentId,
    ends: [WireEnd; 2],
}

impl WireSegment {
    /// The segment's unique ID.
    pub fn id(&self) -> SegmentId {
        self.id
    }

    /// Both endpoints, in declaration order.
    pub fn ends(&self) -> [WireEnd; 2] {
        self.ends
    }
}

/// A transistor chip template.
///
/// Holds the three pins of a bipolar transistor and the polarity of its
/// gate. The *signal input* and *signal output* name the conduction path
/// in the direction the mesh edge points: collector to emitter for NPN,
/// emitter to collector for PNP.
#[derive(Debug)]
pub struct TransistorTemplate {
    active_low: bool,
    base: Pin,
    signal_input: Pin,
    signal_output: Pin,
}

impl TransistorTemplate {
    /// An NPN transistor: conducts while the base is high.
    pub fn npn() -> Arc<Self> {
        Arc::new(Self {
            active_low: false,
            base: Pin::new("base"),
            signal_input: Pin::new("collector"),
            signal_output: Pin::new("emitter"),
        })
    }

    /// A PNP transistor: conducts while the base is low.
    pub fn pnp() -> Arc<Self> {
        Arc::new(Self {
            active_low: true,
            base: Pin::new("base"),
            signal_input: Pin::new("emitter"),
            signal_output: Pin::new("collector"),
        })
    }

    /// Whether the gate is active-low (PNP).
    pub fn active_low(&self) -> bool {
        self.active_low
    }

    /// The gate pin.
    pub fn base(&self) -> &Pin {
        &self.base
    }

    /// The pin signals conduct from while the transistor is active.
    pub fn signal_input(&self) -> &Pin {
        &self.signal_input
    }

    /// The pin signals conduct to while the transistor is active.
    pub fn signal_output(&self) -> &Pin {
        &self.signal_output
    }
}

/// A built-in simulated chip template: declared input and output pins
/// plus the [`ChipBehavior`] computing outputs from inputs each tick.
pub struct BuiltinTemplate {
    name: String,
    inputs: Vec<Pin>,
    outputs: Vec<Pin>,
    behavior: Arc<dyn ChipBehavior>,
}

impl BuiltinTemplate {
    /// Create a built-in template.
    pub fn new(
        name: impl Into<String>,
        inputs: Vec<Pin>,
        outputs: Vec<Pin>,
        behavior: Arc<dyn ChipBehavior>,
    ) -> Arc<Self> {
        Arc::new(Self {
            name: name.into(),
            inputs,
            outputs,
            behavior,
        })
    }

    /// The template's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared input pins.
    pub fn input_pins(&self) -> &[Pin] {
        &self.inputs
    }

    /// Declared output pins.
    pub fn output_pins(&self) -> &[Pin] {
        &self.outputs
    }

    /// The simulation function bound to this template.
    pub fn behavior(&self) -> &dyn ChipBehavior {
        self.behavior.as_ref()
    }
}

impl std::fmt::Debug for BuiltinTemplate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuiltinTemplate")
            .field("name", &self.name)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .finish_non_exhaustive()
    }
}

/// The template of a chip instance: what is inside it.
///
/// This is a closed sum dispatched once during mesh generation; the tick
/// path never inspects chip kinds again.
#[derive(Clone, Debug)]
pub enum ChipTemplate {
    /// A primitive transistor, simulated as a gated mesh edge.
    Transistor(Arc<TransistorTemplate>),
    /// A built-in chip simulated by a [`ChipBehavior`] function.
    Builtin(Arc<BuiltinTemplate>),
    /// A composite chip nesting another design. Its externally visible
    /// pins are the nested design's boundary pins.
    Composite(Arc<Design>),
}

impl ChipTemplate {
    /// Every pin a chip with this template exposes to its enclosing
    /// design level.
    pub fn pins(&self) -> Vec<&Pin> {
        match self {
            Self::Transistor(t) => vec![t.base(), t.signal_input(), t.signal_output()],
            Self::Builtin(t) => t.input_pins().iter().chain(t.output_pins()).collect(),
            Self::Composite(d) => d.pins().collect(),
        }
    }
}

/// A chip instance placed within a design.
#[derive(Clone, Debug)]
pub struct Chip {
    id: ChipId,
    name: String,
    template: ChipTemplate,
}

impl Chip {
    /// Create a chip instance with a fresh unique ID.
    pub fn new(name: impl Into<String>, template: ChipTemplate) -> Self {
        Self {
            id: ChipId::next(),
            name: name.into(),
            template,
        }
    }

    /// The chip's unique instance ID.
    pub fn id(&self) -> ChipId {
        self.id
    }

    /// The chip's display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The chip's template.
    pub fn template(&self) -> &ChipTemplate {
        &self.template
    }
}

/// One level of a circuit: boundary pins, chip instances, and wiring.
///
/// Iteration over pins, chips, nodes, and segments follows insertion
/// order, which keeps mesh generation deterministic for a fixed design.
#[derive(Clone, Debug, Default)]
pub struct Design {
    pins: IndexMap<PinId, Pin>,
    chips: IndexMap<ChipId, Chip>,
    wire_nodes: IndexMap<NodeId, WireNode>,
    wire_segments: IndexMap<SegmentId, WireSegment>,
}

impl Design {
    /// Create an empty design.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a boundary pin; returns its ID.
    pub fn add_pin(&mut self, pin: Pin) -> PinId {
        let id = pin.id();
        self.pins.insert(id, pin);
        id
    }

    /// Add a chip instance; returns its ID.
    pub fn add_chip(&mut self, chip: Chip) -> ChipId {
        let id = chip.id();
        self.chips.insert(id, chip);
        id
    }

    /// Add a wire node; returns its ID.
    pub fn add_node(&mut self) -> NodeId {
        let id = NodeId::next();
        self.wire_nodes.insert(id, WireNode { id });
        id
    }

    /// Add a wire segment between two endpoints; returns its ID.
    pub fn add_segment(&mut self, a: WireEnd, b: WireEnd) -> SegmentId {
        let id = SegmentId::next();
        self.wire_segments.insert(id, WireSegment { id, ends: [a, b] });
        id
    }

    /// The design's boundary pins.
    pub fn pins(&self) -> impl Iterator<Item = &Pin> {
        self.pins.values()
    }

    /// The chip instances placed in this design.
    pub fn chips(&self) -> impl Iterator<Item = &Chip> {
        self.chips.values()
    }

    /// Look up a chip instance by ID.
    pub fn chip(&self, id: ChipId) -> Option<&Chip> {
        self.chips.get(&id)
    }

    /// The design's wire nodes.
    pub fn wire_nodes(&self) -> impl Iterator<Item = &WireNode> {
        self.wire_nodes.values()
    }

    /// The design's wire segments.
    pub fn wire_segments(&self) -> impl Iterator<Item = &WireSegment> {
        self.wire_segments.values()
    }

    /// Total transistors in this design, recursing through composites.
    pub fn transistor_count(&self) -> usize {
        self.chips
            .values()
            .map(|chip| match chip.template() {
                ChipTemplate::Transistor(_) => 1,
                ChipTemplate::Builtin(_) => 0,
                ChipTemplate::Composite(design) => design.transistor_count(),
            })
            .sum()
    }
}
