//! The [`ChipBehavior`] trait.

use crate::state::ChipState;

/// The simulation function of a built-in chip.
///
/// Implementations are invoked once per tick by the engine with the chip
/// instance's persistent [`ChipState`]: input-pin entries are refreshed
/// from the mesh before the call, and output-pin entries are read back
/// afterwards to decide whether anything needs to propagate.
///
/// # Contract
///
/// - `simulate()` must derive its outputs only from the given state; all
///   cross-tick memory goes through the `ChipState` (or interior state on
///   the implementation itself, for externally stimulated chips such as
///   switches).
/// - Implementations run on worker threads, potentially concurrently with
///   other chips (never concurrently with themselves), hence
///   `Send + Sync`.
/// - A panicking behavior does not stop the simulation: the engine
///   contains the failure, marks the chip's output nets conflicted, and
///   finishes the tick without it.
pub trait ChipBehavior: Send + Sync {
    /// Compute one tick: read input-pin levels from `state`, write
    /// output-pin levels back into it.
    fn simulate(&self, state: &mut ChipState);
}
