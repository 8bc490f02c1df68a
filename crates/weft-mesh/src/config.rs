//! The flat registry produced by mesh generation.

use std::sync::Arc;

use crate::connector::Connector;
use crate::design::SimulatedDesign;
use crate::function::Function;
use crate::vertex::Vertex;

/// Everything the tick coordinator needs to drive one circuit: the flat
/// sets of vertices, connectors, and chip functions, plus the root of
/// the hierarchical [`SimulatedDesign`] query tree.
///
/// Immutable once built; re-initializing a circuit produces a fresh
/// config rather than mutating this one.
#[derive(Debug, Default)]
pub struct SimulationConfig {
    pub(crate) vertices: Vec<Arc<Vertex>>,
    pub(crate) connectors: Vec<Arc<Connector>>,
    pub(crate) functions: Vec<Arc<Function>>,
    pub(crate) root: Arc<SimulatedDesign>,
}

impl SimulationConfig {
    /// Every vertex in the mesh.
    pub fn vertices(&self) -> &[Arc<Vertex>] {
        &self.vertices
    }

    /// Every connector in the mesh.
    pub fn connectors(&self) -> &[Arc<Connector>] {
        &self.connectors
    }

    /// Every chip function in the mesh.
    pub fn functions(&self) -> &[Arc<Function>] {
        &self.functions
    }

    /// The top-level simulated design.
    pub fn root(&self) -> Arc<SimulatedDesign> {
        self.root.clone()
    }
}
