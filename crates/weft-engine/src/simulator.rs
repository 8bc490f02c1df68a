//! The [`Simulator`] trait and its meshed implementation.

use std::sync::{Arc, Mutex};

use weft_core::{Design, MeshError};
use weft_mesh::SimulatedDesign;

use crate::config::EngineConfig;
use crate::coordinator::Coordinator;
use crate::sync::lock;

/// A simulation module responsible for assigning logic states to design
/// elements.
///
/// Simulators are modular: the tick timer can swap one for another at
/// runtime, stopping the old module before the new one starts. All
/// methods take `&self` because the timer thread and the application
/// thread share the simulator; implementations serialize internally,
/// which is also what guarantees a re-initialization never interleaves
/// with an in-flight tick.
pub trait Simulator: Send + Sync {
    /// Build whatever internal structures the module needs for
    /// `design`, replacing any previous circuit, and return the
    /// queryable simulated design.
    ///
    /// # Errors
    ///
    /// Returns a [`MeshError`] when the design's topology cannot be
    /// collapsed into a mesh.
    fn initialize(&self, design: &Design) -> Result<Arc<SimulatedDesign>, MeshError>;

    /// Prepare for ticking. Called before the first tick, and again
    /// after the module has been stopped and resumed. Idempotent.
    fn start(&self);

    /// Release tick resources. State is kept: a stopped simulator can
    /// be started again and continues where it left off.
    fn stop(&self);

    /// Advance the simulation one tick.
    fn tick(&self);

    /// Return the module to its initial state as closely as possible.
    /// Always called between ticks, on the timer thread.
    fn reset(&self);
}

/// The canonical [`Simulator`]: mesh generation plus the three-phase
/// tick [`Coordinator`].
pub struct MeshSimulator {
    coordinator: Mutex<Coordinator>,
}

impl MeshSimulator {
    /// Create a mesh simulator with `config`'s worker pool size.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            coordinator: Mutex::new(Coordinator::new(config.worker_threads)),
        }
    }
}

impl Simulator for MeshSimulator {
    fn initialize(&self, design: &Design) -> Result<Arc<SimulatedDesign>, MeshError> {
        let config = weft_mesh::build(design)?;
        let root = config.root();
        lock(&self.coordinator).configure(Arc::new(config));
        Ok(root)
    }

    fn start(&self) {
        lock(&self.coordinator).start();
    }

    fn stop(&self) {
        lock(&self.coordinator).stop();
    }

    fn tick(&self) {
        lock(&self.coordinator).tick();
    }

    fn reset(&self) {
        lock(&self.coordinator).reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::{Chip, ChipTemplate, LogicState, Pin, WireEnd};

    #[test]
    fn initialize_replaces_the_previous_circuit() {
        let simulator = MeshSimulator::new(&EngineConfig::default());
        simulator.start();

        let mut first = Design::new();
        let first_probe = first.add_pin(Pin::new("probe"));
        let source = weft_chips::driven(LogicState::High);
        let out = source.output_pins()[0].id();
        let chip = first.add_chip(Chip::new("one", ChipTemplate::Builtin(source)));
        first.add_segment(WireEnd::chip_pin(chip, out), WireEnd::design_pin(first_probe));

        let first_root = simulator.initialize(&first).unwrap();
        simulator.tick();
        assert_eq!(first_root.state_for_pin(first_probe), LogicState::High);

        // A fresh circuit gets a fresh simulated design; the old root
        // keeps its last rectified state but no longer advances.
        let mut second = Design::new();
        let second_probe = second.add_pin(Pin::new("probe"));
        let second_root = simulator.initialize(&second).unwrap();
        simulator.tick();
        assert_eq!(
            second_root.state_for_pin(second_probe),
            LogicState::Unconnected
        );

        simulator.stop();
    }
}
