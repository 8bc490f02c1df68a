//! Strongly-typed identifiers for circuit elements and mesh vertices.
//!
//! Circuit-element IDs are allocated from process-wide monotonic atomic
//! counters, so two elements never share an ID even across independently
//! constructed designs. Templates shared by several chip instances
//! therefore carry the *same* pin IDs on every instance; mesh generation
//! disambiguates them by ancestry path.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

macro_rules! counted_id {
    ($(#[$doc:meta])* $name:ident, $counter:ident) => {
        static $counter: AtomicU32 = AtomicU32::new(1);

        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            /// Allocate a fresh, unique ID. Thread-safe.
            pub fn next() -> Self {
                Self($counter.fetch_add(1, Ordering::Relaxed))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

counted_id!(
    /// Identifies a [`Pin`](crate::circuit::Pin) within its owning template
    /// or design.
    PinId,
    PIN_COUNTER
);

counted_id!(
    /// Identifies a [`Chip`](crate::circuit::Chip) instance.
    ChipId,
    CHIP_COUNTER
);

counted_id!(
    /// Identifies a [`WireNode`](crate::circuit::WireNode) within a design.
    NodeId,
    NODE_COUNTER
);

counted_id!(
    /// Identifies a [`WireSegment`](crate::circuit::WireSegment) within a
    /// design.
    SegmentId,
    SEGMENT_COUNTER
);

counted_id!(
    /// Identifies a mesh vertex (one electrically-equivalent net).
    ///
    /// Vertex identity is accidental: it is stable for the lifetime of one
    /// simulation config but carries no meaning across mesh rebuilds.
    VertexId,
    VERTEX_COUNTER
);
