//! The connector: a transistor's gate, with switching delay.

use std::sync::{Arc, Mutex};

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use weft_core::LogicState;

use crate::sync::lock;
use crate::vertex::Vertex;

/// Upper bound on the random switching delay, in ticks.
const MAX_SWITCHING_DELAY: u8 = 3;

#[derive(Debug)]
struct ConnectorState {
    /// Whether the gated edges currently conduct.
    connected: bool,
    /// The direction the connector is switching toward.
    connecting: bool,
    /// Remaining ticks before `connected` catches up with `connecting`.
    delay: Option<u8>,
    rng: ChaCha8Rng,
}

/// A delayed, signal-gated conductor modeling a transistor's gate.
///
/// Each tick the connector compares its *decider* vertex (the base)
/// against the active level. When the observed direction changes, a new
/// random delay of one to three ticks is drawn; the connected state
/// flips only once the delay has counted down, so a
/// gate observed changing at tick T conducts (or stops conducting) at
/// some tick in `[T+1, T+3]`, never at T itself. A direction change
/// mid-delay redraws the delay.
///
/// The delay counter is touched only by this connector's own compute
/// task, one task per tick; the lock exists so the propagate phase can
/// read `connected` safely.
#[derive(Debug)]
pub struct Connector {
    decider: Arc<Vertex>,
    active_low: bool,
    state: Mutex<ConnectorState>,
}

impl Connector {
    /// Create a connector in its conservative default state:
    /// `connected == active_low`, no delay pending.
    ///
    /// `seed` feeds the connector's private delay RNG; the mesh builder
    /// assigns one per connector so rebuilds of the same design draw
    /// identical delay sequences.
    pub fn new(decider: Arc<Vertex>, active_low: bool, seed: u64) -> Arc<Self> {
        Arc::new(Self {
            decider,
            active_low,
            state: Mutex::new(ConnectorState {
                connected: active_low,
                connecting: active_low,
                delay: None,
                rng: ChaCha8Rng::seed_from_u64(seed),
            }),
        })
    }

    /// Whether the gated edges currently conduct.
    pub fn is_connected(&self) -> bool {
        lock(&self.state).connected
    }

    /// Restore the default connected state and cancel any pending delay.
    pub fn reset(&self) {
        let mut state = lock(&self.state);
        state.connected = self.active_low;
        state.connecting = self.active_low;
        state.delay = None;
    }

    /// Advance one tick: observe the decider, manage the switching
    /// delay, and flip the connected state when the delay expires.
    ///
    /// Returns `true` when the connected state flipped this tick, which
    /// the coordinator counts as a change for its steady-state check.
    pub fn tick(&self) -> bool {
        let active_level = if self.active_low {
            LogicState::Low
        } else {
            LogicState::High
        };
        let decider_active = self.decider.actual() == active_level;

        let mut state = lock(&self.state);
        if state.connecting != decider_active {
            state.connecting = decider_active;
            let delay = state.rng.random_range(1..=MAX_SWITCHING_DELAY);
            state.delay = Some(delay);
            return false;
        }

        if let Some(remaining) = state.delay {
            if remaining <= 1 {
                state.connected = state.connecting;
                state.delay = None;
                return true;
            }
            state.delay = Some(remaining - 1);
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drive(vertex: &Vertex, state: LogicState) {
        vertex.set_actual(state);
        vertex.rectify();
    }

    #[test]
    fn starts_disconnected_when_active_high() {
        let base = Vertex::new();
        let connector = Connector::new(base, false, 0);
        assert!(!connector.is_connected());
    }

    #[test]
    fn starts_connected_when_active_low() {
        let base = Vertex::new();
        let connector = Connector::new(base, true, 0);
        assert!(connector.is_connected());
    }

    #[test]
    fn flips_within_the_delay_window_but_never_immediately() {
        for seed in 0..16 {
            let base = Vertex::new();
            let connector = Connector::new(base.clone(), false, seed);

            drive(&base, LogicState::High);
            assert!(!connector.tick(), "observation tick must not flip");
            assert!(!connector.is_connected());

            let mut flipped_at = None;
            for tick in 1..=MAX_SWITCHING_DELAY as u32 {
                if connector.tick() {
                    flipped_at = Some(tick);
                    break;
                }
            }
            let flipped_at = flipped_at.expect("connector never flipped");
            assert!(
                (1..=MAX_SWITCHING_DELAY as u32).contains(&flipped_at),
                "flip at offset {flipped_at} outside the delay window"
            );
            assert!(connector.is_connected());
        }
    }

    #[test]
    fn direction_change_mid_delay_redraws() {
        let base = Vertex::new();
        let connector = Connector::new(base.clone(), false, 7);

        drive(&base, LogicState::High);
        connector.tick();
        drive(&base, LogicState::Low);
        connector.tick();

        // The gate never turned on, and settling back toward off keeps
        // it off no matter how long the redraw was.
        for _ in 0..MAX_SWITCHING_DELAY {
            connector.tick();
        }
        assert!(!connector.is_connected());
    }

    #[test]
    fn steady_decider_causes_no_flips() {
        let base = Vertex::new();
        let connector = Connector::new(base.clone(), false, 3);
        drive(&base, LogicState::Low);
        for _ in 0..8 {
            assert!(!connector.tick());
        }
        assert!(!connector.is_connected());
    }

    #[test]
    fn reset_restores_defaults() {
        let base = Vertex::new();
        let connector = Connector::new(base.clone(), false, 11);
        drive(&base, LogicState::High);
        for _ in 0..=MAX_SWITCHING_DELAY {
            connector.tick();
        }
        assert!(connector.is_connected());

        connector.reset();
        assert!(!connector.is_connected());
    }
}
