//! The unit of simulated state: one electrically-equivalent net.

use std::sync::{Arc, Mutex};

use weft_core::{LogicState, VertexId};

use crate::edge::Edge;
use crate::sync::lock;

/// A desired (actual, suggested) state pair produced by a chip function
/// and carried through the propagation phase.
///
/// [`LogicState::Unknown`] components are no-signal sentinels: they are
/// never applied to a vertex and never force an update.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StateChange {
    /// The desired driven level.
    pub actual: LogicState,
    /// The desired pulled level.
    pub suggested: LogicState,
}

/// A pending propagation request: apply `change` to `vertex`, then fan
/// out over its connected edges.
#[derive(Clone)]
pub struct StateUpdate {
    /// The target vertex.
    pub vertex: Arc<Vertex>,
    /// The state pair to apply.
    pub change: StateChange,
}

#[derive(Debug, Default)]
struct VertexState {
    actual: LogicState,
    suggested: LogicState,
    sim_actual: LogicState,
    sim_suggested: LogicState,
}

/// One equivalence class of galvanically connected pins.
///
/// Holds two externally visible fields (`actual`, `suggested`),
/// committed at the end of the previous tick, and two in-progress
/// fields mutated only during the current tick's compute and propagate
/// phases. All mutation goes through the accessor methods, each
/// synchronized per-vertex: tasks on several worker threads may target
/// the same vertex concurrently, and the merge rules below are written
/// so the conflicted-or-not outcome does not depend on arrival order of
/// a conflicting pair.
///
/// Created once per equivalence class during mesh generation and lives
/// for the lifetime of its [`SimulationConfig`](crate::SimulationConfig).
#[derive(Debug)]
pub struct Vertex {
    id: VertexId,
    edges: Mutex<Vec<Edge>>,
    state: Mutex<VertexState>,
}

impl Vertex {
    /// Create a fresh vertex with all four fields
    /// [`LogicState::Unconnected`] and no outgoing edges.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            id: VertexId::next(),
            edges: Mutex::new(Vec::new()),
            state: Mutex::new(VertexState::default()),
        })
    }

    /// The vertex's ID, for diagnostics.
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// The committed driven state, as of the last completed tick.
    pub fn actual(&self) -> LogicState {
        lock(&self.state).actual
    }

    /// The committed pulled state, as of the last completed tick.
    pub fn suggested(&self) -> LogicState {
        lock(&self.state).suggested
    }

    /// Attach an outgoing edge. Only called during mesh generation.
    pub fn add_edge(&self, edge: Edge) {
        lock(&self.edges).push(edge);
    }

    /// Visit every outgoing edge.
    pub fn for_each_edge(&self, mut f: impl FnMut(&Edge)) {
        for edge in lock(&self.edges).iter() {
            f(edge);
        }
    }

    /// Merge an incoming state into an in-progress field.
    ///
    /// Conflicted is sticky for the remainder of the tick; two differing
    /// exclusive levels short the net to conflicted; anything else is
    /// overwritten by the incoming value.
    fn merge(current: &mut LogicState, incoming: LogicState) {
        if *current == LogicState::Conflicted {
            return;
        }
        if current.is_exclusive() && incoming.is_exclusive() && *current != incoming {
            *current = LogicState::Conflicted;
        } else {
            *current = incoming;
        }
    }

    /// Apply a driven level to the in-progress state.
    pub fn set_actual(&self, state: LogicState) {
        Self::merge(&mut lock(&self.state).sim_actual, state);
    }

    /// Apply a pulled level to the in-progress state.
    pub fn set_suggested(&self, state: LogicState) {
        Self::merge(&mut lock(&self.state).sim_suggested, state);
    }

    /// Apply a full state pair, skipping [`LogicState::Unknown`]
    /// components.
    pub fn apply(&self, change: StateChange) {
        let mut state = lock(&self.state);
        if change.actual != LogicState::Unknown {
            Self::merge(&mut state.sim_actual, change.actual);
        }
        if change.suggested != LogicState::Unknown {
            Self::merge(&mut state.sim_suggested, change.suggested);
        }
    }

    /// Whether applying `change` would alter this vertex's in-progress
    /// state.
    ///
    /// Returns `false` once the vertex is conflicted — a propagation
    /// wavefront reaching the same vertex twice stops here rather than
    /// re-triggering work. [`LogicState::Unknown`] components never
    /// force an update.
    pub fn compare(&self, change: StateChange) -> bool {
        let state = lock(&self.state);
        if state.sim_actual == LogicState::Conflicted {
            return false;
        }
        if change.actual != LogicState::Unknown && state.sim_actual != change.actual {
            return true;
        }
        if state.sim_suggested == LogicState::Conflicted {
            return false;
        }
        change.suggested != LogicState::Unknown && state.sim_suggested != change.suggested
    }

    /// Mark the in-progress state conflicted, e.g. when the chip driving
    /// this net failed mid-tick. Sticky like any other conflict.
    pub fn mark_conflicted(&self) {
        let mut state = lock(&self.state);
        state.sim_actual = LogicState::Conflicted;
        state.sim_suggested = LogicState::Conflicted;
    }

    /// Commit the in-progress state into the externally visible fields
    /// and clear the scratch fields for the next tick.
    ///
    /// A net with no active driver this tick falls back to its weak
    /// pull: an unconnected in-progress actual is promoted from the
    /// in-progress suggested before the copy.
    pub fn rectify(&self) {
        let mut state = lock(&self.state);
        if state.sim_actual == LogicState::Unconnected {
            state.sim_actual = state.sim_suggested;
        }
        state.actual = state.sim_actual;
        state.suggested = state.sim_suggested;
        state.sim_actual = LogicState::Unconnected;
        state.sim_suggested = LogicState::Unconnected;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn change(actual: LogicState, suggested: LogicState) -> StateChange {
        StateChange { actual, suggested }
    }

    #[test]
    fn opposing_drivers_conflict_in_either_order() {
        for (first, second) in [
            (LogicState::High, LogicState::Low),
            (LogicState::Low, LogicState::High),
        ] {
            let vertex = Vertex::new();
            vertex.set_actual(first);
            vertex.set_actual(second);
            vertex.rectify();
            assert_eq!(vertex.actual(), LogicState::Conflicted);
        }
    }

    #[test]
    fn agreeing_drivers_do_not_conflict() {
        let vertex = Vertex::new();
        vertex.set_actual(LogicState::High);
        vertex.set_actual(LogicState::High);
        vertex.rectify();
        assert_eq!(vertex.actual(), LogicState::High);
    }

    #[test]
    fn conflict_is_sticky_within_a_tick() {
        let vertex = Vertex::new();
        vertex.set_actual(LogicState::High);
        vertex.set_actual(LogicState::Low);
        vertex.set_actual(LogicState::Unconnected);
        vertex.rectify();
        assert_eq!(vertex.actual(), LogicState::Conflicted);
    }

    #[test]
    fn unknown_never_applies() {
        let vertex = Vertex::new();
        vertex.apply(change(LogicState::High, LogicState::Unknown));
        vertex.apply(change(LogicState::Unknown, LogicState::Unknown));
        vertex.rectify();
        assert_eq!(vertex.actual(), LogicState::High);
        assert_eq!(vertex.suggested(), LogicState::Unconnected);
    }

    #[test]
    fn rectify_promotes_pull_when_undriven() {
        let vertex = Vertex::new();
        vertex.set_suggested(LogicState::High);
        vertex.rectify();
        assert_eq!(vertex.actual(), LogicState::High);
        assert_eq!(vertex.suggested(), LogicState::High);
    }

    #[test]
    fn rectify_prefers_driver_over_pull() {
        let vertex = Vertex::new();
        vertex.set_actual(LogicState::Low);
        vertex.set_suggested(LogicState::High);
        vertex.rectify();
        assert_eq!(vertex.actual(), LogicState::Low);
        assert_eq!(vertex.suggested(), LogicState::High);
    }

    #[test]
    fn rectify_clears_scratch_state() {
        let vertex = Vertex::new();
        vertex.set_actual(LogicState::High);
        vertex.rectify();
        vertex.rectify();
        assert_eq!(vertex.actual(), LogicState::Unconnected);
    }

    #[test]
    fn compare_is_false_once_state_matches() {
        let vertex = Vertex::new();
        let update = change(LogicState::High, LogicState::Unknown);
        assert!(vertex.compare(update));
        vertex.apply(update);
        assert!(!vertex.compare(update), "second arrival must be a no-op");
    }

    #[test]
    fn compare_is_false_when_conflicted() {
        let vertex = Vertex::new();
        vertex.set_actual(LogicState::High);
        vertex.set_actual(LogicState::Low);
        assert!(!vertex.compare(change(LogicState::High, LogicState::Unknown)));
    }

    #[test]
    fn compare_considers_suggested_when_actual_silent() {
        let vertex = Vertex::new();
        assert!(vertex.compare(change(LogicState::Unknown, LogicState::Low)));
        vertex.set_suggested(LogicState::Low);
        assert!(!vertex.compare(change(LogicState::Unknown, LogicState::Low)));
    }

    #[test]
    fn mark_conflicted_commits_through_rectify() {
        let vertex = Vertex::new();
        vertex.set_actual(LogicState::High);
        vertex.mark_conflicted();
        vertex.set_actual(LogicState::High);
        vertex.rectify();
        assert_eq!(vertex.actual(), LogicState::Conflicted);
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        fn any_state() -> impl Strategy<Value = LogicState> {
            prop_oneof![
                Just(LogicState::Low),
                Just(LogicState::High),
                Just(LogicState::Unconnected),
                Just(LogicState::Conflicted),
                Just(LogicState::Unknown),
            ]
        }

        proptest! {
            /// Once conflicted, no later write can un-conflict a vertex.
            #[test]
            fn conflict_is_permanent(states in prop::collection::vec(any_state(), 0..16)) {
                let vertex = Vertex::new();
                vertex.set_actual(LogicState::High);
                vertex.set_actual(LogicState::Low);
                for state in states {
                    vertex.set_actual(state);
                }
                vertex.rectify();
                prop_assert_eq!(vertex.actual(), LogicState::Conflicted);
            }

            /// Applying the same change twice is idempotent: the second
            /// application neither alters state nor reports a needed
            /// update.
            #[test]
            fn apply_is_idempotent(actual in any_state(), suggested in any_state()) {
                let update = StateChange { actual, suggested };
                let vertex = Vertex::new();
                vertex.apply(update);
                let needs_more = vertex.compare(update);
                prop_assert!(!needs_more);

                let once = Vertex::new();
                once.apply(update);
                once.rectify();
                let twice = Vertex::new();
                twice.apply(update);
                twice.apply(update);
                twice.rectify();
                prop_assert_eq!(once.actual(), twice.actual());
                prop_assert_eq!(once.suggested(), twice.suggested());
            }

            /// An opposing exclusive pair conflicts regardless of what
            /// non-exclusive writes are interleaved around it.
            #[test]
            fn exclusive_pair_always_conflicts(
                prefix in prop::collection::vec(
                    prop_oneof![Just(LogicState::Unconnected), Just(LogicState::High)],
                    0..4,
                ),
            ) {
                let vertex = Vertex::new();
                for state in prefix {
                    vertex.set_actual(state);
                }
                vertex.set_actual(LogicState::High);
                vertex.set_actual(LogicState::Low);
                vertex.rectify();
                prop_assert_eq!(vertex.actual(), LogicState::Conflicted);
            }
        }
    }
}
