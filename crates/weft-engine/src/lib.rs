//! Tick coordination and timing for the weft simulation engine.
//!
//! The engine drives a [`SimulationConfig`](weft_mesh::SimulationConfig)
//! through time: the [`Coordinator`] executes one tick as three barrier
//! phases (compute, propagate, rectify) over a fixed worker pool, and
//! the [`TickTimer`] paces those ticks from a dedicated thread. The
//! [`Simulation`] facade ties both to a swappable [`Simulator`]
//! implementation.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod config;
pub mod coordinator;
pub mod pool;
pub mod simulation;
pub mod simulator;
pub mod timer;

pub(crate) mod sync;

pub use config::{ConfigError, EngineConfig};
pub use coordinator::Coordinator;
pub use pool::{PoolHandle, WorkerPool};
pub use simulation::{Simulation, SimulationError};
pub use simulator::{MeshSimulator, Simulator};
pub use timer::TickTimer;
