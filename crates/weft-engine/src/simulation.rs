//! The application-facing simulation lifecycle facade.

use std::error::Error;
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use weft_core::{Design, MeshError};
use weft_mesh::SimulatedDesign;

use crate::config::{ConfigError, EngineConfig};
use crate::simulator::{MeshSimulator, Simulator};
use crate::sync::lock;
use crate::timer::TickTimer;

/// Errors from the [`Simulation`] lifecycle surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimulationError {
    /// No simulator module has been installed.
    NoSimulator,
    /// Mesh generation failed for the given design.
    Mesh(MeshError),
}

impl fmt::Display for SimulationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoSimulator => write!(f, "no simulator module installed"),
            Self::Mesh(reason) => write!(f, "mesh generation failed: {reason}"),
        }
    }
}

impl Error for SimulationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Mesh(reason) => Some(reason),
            Self::NoSimulator => None,
        }
    }
}

impl From<MeshError> for SimulationError {
    fn from(reason: MeshError) -> Self {
        Self::Mesh(reason)
    }
}

/// Owns the tick timer and the installed simulator module, and exposes
/// the lifecycle surface the application layer drives: initialize,
/// start, stop, reset.
pub struct Simulation {
    timer: TickTimer,
    simulator: Mutex<Option<Arc<dyn Simulator>>>,
}

impl Simulation {
    /// Create a simulation with no simulator installed yet.
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            timer: TickTimer::new(config.target_cycle),
            simulator: Mutex::new(None),
        }
    }

    /// Create a simulation driving the canonical [`MeshSimulator`].
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` is invalid.
    pub fn with_mesh_simulator(config: &EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let simulation = Self::new(config);
        simulation.set_simulator(Arc::new(MeshSimulator::new(config)));
        Ok(simulation)
    }

    /// Install a simulator module. The previous module, if any, is
    /// stopped by the timer before the new one starts.
    pub fn set_simulator(&self, simulator: Arc<dyn Simulator>) {
        *lock(&self.simulator) = Some(simulator.clone());
        self.timer.set_simulator(simulator);
    }

    /// Build the mesh for `design`, replacing any current circuit, and
    /// return the queryable simulated design.
    ///
    /// A reset is flagged first so state from a previously loaded
    /// circuit cannot leak into the new one.
    ///
    /// # Errors
    ///
    /// [`SimulationError::NoSimulator`] when no module is installed;
    /// [`SimulationError::Mesh`] when mesh generation fails.
    pub fn initialize(&self, design: &Design) -> Result<Arc<SimulatedDesign>, SimulationError> {
        self.reset();
        let simulator = lock(&self.simulator)
            .clone()
            .ok_or(SimulationError::NoSimulator)?;
        Ok(simulator.initialize(design)?)
    }

    /// Start the timer thread (which starts the simulator).
    pub fn start(&self) {
        self.timer.start();
    }

    /// Stop the timer thread (which stops the simulator).
    pub fn stop(&self) {
        self.timer.stop();
    }

    /// Flag a reset to occur before the next tick rather than
    /// immediately, preserving the no-mid-tick-mutation guarantee.
    pub fn reset(&self) {
        self.timer.request_reset();
    }

    /// Whether the timer loop is running.
    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Change the timer's target cycle duration.
    pub fn set_target_cycle(&self, target_cycle: Duration) {
        self.timer.set_target_cycle(target_cycle);
    }
}
