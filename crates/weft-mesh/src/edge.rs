//! A directed, connector-gated link between two vertices.

use std::sync::Arc;

use crate::connector::Connector;
use crate::vertex::Vertex;

/// A conditionally conductive link from one vertex to an endpoint
/// vertex, gated by a [`Connector`].
///
/// Edges are immutable after mesh generation. The builder only
/// constructs an edge once both the endpoint vertex and the connector
/// have been resolved; an unresolvable endpoint aborts generation with
/// [`MeshError::UnboundPin`](weft_core::MeshError::UnboundPin) instead.
#[derive(Clone, Debug)]
pub struct Edge {
    endpoint: Arc<Vertex>,
    connector: Arc<Connector>,
}

impl Edge {
    /// Create an edge to `endpoint`, gated by `connector`.
    pub fn new(endpoint: Arc<Vertex>, connector: Arc<Connector>) -> Self {
        Self {
            endpoint,
            connector,
        }
    }

    /// The vertex this edge leads to.
    pub fn endpoint(&self) -> &Arc<Vertex> {
        &self.endpoint
    }

    /// Whether the gating connector currently conducts.
    pub fn is_connected(&self) -> bool {
        self.connector.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::LogicState;

    #[test]
    fn edge_tracks_its_connector() {
        let base = Vertex::new();
        let endpoint = Vertex::new();
        let connector = Connector::new(base.clone(), false, 1);
        let edge = Edge::new(endpoint, connector);
        assert!(!edge.is_connected());

        base.set_actual(LogicState::High);
        base.rectify();
        // Not flipped yet: the delay has not elapsed.
        assert!(!edge.is_connected());
    }
}
