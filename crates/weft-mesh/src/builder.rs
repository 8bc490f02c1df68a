//! Mesh generation: collapsing a circuit's wiring into vertices.
//!
//! Generation runs in three passes over the circuit hierarchy:
//!
//! 1. **Collect** — visit every chip instance depth-first, register
//!    every pin as an ancestry-qualified mesh pin, partition each
//!    level's wiring into connected wire sets, and record pin-to-pin
//!    adjacency through those sets.
//! 2. **Mesh** — flood-fill the pin adjacency graph; every connected
//!    component becomes one [`Vertex`] shared by all its pins.
//! 3. **Assemble** — rebuild the hierarchy as a [`SimulatedDesign`]
//!    tree and create the gating structures: a [`Connector`]-gated
//!    [`Edge`] per transistor, a [`Function`] per built-in chip.
//!
//! Ancestry paths are interned in a hash-consing arena, so a mesh pin
//! is a two-word `Copy` key no matter how deep the hierarchy nests, and
//! two instances of the same template never share vertices.

use std::sync::Arc;

use indexmap::{IndexMap, IndexSet};
use smallvec::SmallVec;
use tracing::info;

use weft_core::{
    BuiltinTemplate, Chip, ChipId, ChipTemplate, Design, MeshError, NodeId, PinId, SegmentId,
    TransistorTemplate, WireEnd,
};

use crate::config::SimulationConfig;
use crate::connector::Connector;
use crate::design::SimulatedDesign;
use crate::edge::Edge;
use crate::function::Function;
use crate::vertex::Vertex;

/// An interned chip-ancestry path.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct PathId(u32);

/// Hash-consing arena for ancestry paths.
#[derive(Debug, Default)]
struct PathArena {
    paths: IndexSet<Box<[ChipId]>>,
}

impl PathArena {
    fn intern(&mut self, path: &[ChipId]) -> PathId {
        if let Some(index) = self.paths.get_index_of(path) {
            return PathId(index as u32);
        }
        let (index, _) = self.paths.insert_full(path.into());
        PathId(index as u32)
    }

    fn root(&mut self) -> PathId {
        self.intern(&[])
    }

    fn child(&mut self, parent: PathId, chip: ChipId) -> PathId {
        let mut path: SmallVec<[ChipId; 8]> =
            self.paths[parent.0 as usize].iter().copied().collect();
        path.push(chip);
        self.intern(&path)
    }
}

/// A pin disambiguated by the ancestry of its owning chip instance.
/// Generation-time only; discarded once vertices exist.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct MeshPin {
    path: PathId,
    pin: PinId,
}

/// One connected component of a level's wiring.
#[derive(Debug)]
struct WireSet {
    nodes: Vec<NodeId>,
    segments: Vec<SegmentId>,
    pins: Vec<MeshPin>,
}

#[derive(Debug, Default)]
struct Generation {
    paths: PathArena,
    pins: IndexSet<MeshPin>,
    adjacency: IndexMap<MeshPin, IndexSet<MeshPin>>,
    wire_sets: IndexMap<PathId, Vec<WireSet>>,
}

fn vertex_at(
    vertex_map: &IndexMap<MeshPin, Arc<Vertex>>,
    path: PathId,
    pin: PinId,
) -> Result<Arc<Vertex>, MeshError> {
    vertex_map
        .get(&MeshPin { path, pin })
        .cloned()
        .ok_or(MeshError::UnboundPin { pin })
}

impl Generation {
    /// Qualify a segment endpoint into a mesh pin, or `None` for a node
    /// endpoint.
    fn qualify(
        &mut self,
        level: PathId,
        design: &Design,
        segment: SegmentId,
        end: WireEnd,
    ) -> Result<Option<MeshPin>, MeshError> {
        match end {
            WireEnd::Pin { chip: None, pin } => Ok(Some(MeshPin { path: level, pin })),
            WireEnd::Pin {
                chip: Some(chip),
                pin,
            } => {
                if design.chip(chip).is_none() {
                    return Err(MeshError::DanglingEndpoint { segment, chip });
                }
                let path = self.paths.child(level, chip);
                Ok(Some(MeshPin { path, pin }))
            }
            WireEnd::Node(_) => Ok(None),
        }
    }

    fn finish_set(
        &mut self,
        level: PathId,
        design: &Design,
        ends: &IndexMap<SegmentId, [WireEnd; 2]>,
        nodes: Vec<NodeId>,
        segments: Vec<SegmentId>,
    ) -> Result<WireSet, MeshError> {
        let mut pins = IndexSet::new();
        for &segment in &segments {
            for end in ends[&segment].iter().copied() {
                if let Some(pin) = self.qualify(level, design, segment, end)? {
                    pins.insert(pin);
                }
            }
        }
        Ok(WireSet {
            nodes,
            segments,
            pins: pins.into_iter().collect(),
        })
    }

    /// Partition one level's wire nodes and segments into connected
    /// components over the "touches" relation.
    fn partition_wires(
        &mut self,
        level: PathId,
        design: &Design,
    ) -> Result<Vec<WireSet>, MeshError> {
        let ends: IndexMap<SegmentId, [WireEnd; 2]> = design
            .wire_segments()
            .map(|segment| (segment.id(), segment.ends()))
            .collect();
        let mut remaining_nodes: IndexSet<NodeId> =
            design.wire_nodes().map(|node| node.id()).collect();
        let mut remaining_segments: IndexSet<SegmentId> = ends.keys().copied().collect();

        let mut sets = Vec::new();

        while let Some(&start) = remaining_nodes.first() {
            remaining_nodes.shift_remove(&start);
            let mut nodes = vec![start];
            let mut segments = Vec::new();
            let mut stack = vec![start];

            while let Some(node) = stack.pop() {
                let touching: Vec<SegmentId> = remaining_segments
                    .iter()
                    .copied()
                    .filter(|id| ends[id].iter().any(|end| *end == WireEnd::Node(node)))
                    .collect();
                for id in touching {
                    remaining_segments.shift_remove(&id);
                    segments.push(id);
                    for end in ends[&id].iter().copied() {
                        if let WireEnd::Node(other) = end {
                            if remaining_nodes.shift_remove(&other) {
                                nodes.push(other);
                                stack.push(other);
                            }
                        }
                    }
                }
            }

            sets.push(self.finish_set(level, design, &ends, nodes, segments)?);
        }

        // Segments left over after all nodes are consumed wire a pin
        // directly to another pin; each is a trivial single-segment set.
        let leftover: Vec<SegmentId> = remaining_segments.iter().copied().collect();
        for id in leftover {
            sets.push(self.finish_set(level, design, &ends, Vec::new(), vec![id])?);
        }

        Ok(sets)
    }

    /// Pass 1: register pins and adjacency for a level and everything
    /// nested beneath it.
    fn collect_level(&mut self, level: PathId, design: &Design) -> Result<(), MeshError> {
        for pin in design.pins() {
            self.pins.insert(MeshPin {
                path: level,
                pin: pin.id(),
            });
        }

        for chip in design.chips() {
            let chip_path = self.paths.child(level, chip.id());
            for pin in chip.template().pins() {
                self.pins.insert(MeshPin {
                    path: chip_path,
                    pin: pin.id(),
                });
            }
        }

        let sets = self.partition_wires(level, design)?;
        for set in &sets {
            for &pin in &set.pins {
                self.adjacency
                    .entry(pin)
                    .or_default()
                    .extend(set.pins.iter().copied());
            }
        }
        self.wire_sets.insert(level, sets);

        for chip in design.chips() {
            if let ChipTemplate::Composite(inner) = chip.template() {
                let chip_path = self.paths.child(level, chip.id());
                self.collect_level(chip_path, inner)?;
            }
        }
        Ok(())
    }

    /// Pass 2: flood-fill the pin adjacency graph into equivalence
    /// classes, one vertex per class.
    fn build_vertices(&self, config: &mut SimulationConfig) -> IndexMap<MeshPin, Arc<Vertex>> {
        let mut vertex_map = IndexMap::new();
        let mut visited: IndexSet<MeshPin> = IndexSet::new();

        for &origin in &self.pins {
            if visited.contains(&origin) {
                continue;
            }
            visited.insert(origin);
            let vertex = Vertex::new();
            let mut stack = vec![origin];
            while let Some(pin) = stack.pop() {
                vertex_map.insert(pin, vertex.clone());
                if let Some(neighbors) = self.adjacency.get(&pin) {
                    for &next in neighbors {
                        if visited.insert(next) {
                            stack.push(next);
                        }
                    }
                }
            }
            config.vertices.push(vertex);
        }

        vertex_map
    }

    fn bind_transistor(
        &mut self,
        chip_path: PathId,
        template: &TransistorTemplate,
        vertex_map: &IndexMap<MeshPin, Arc<Vertex>>,
        config: &mut SimulationConfig,
    ) -> Result<Arc<SimulatedDesign>, MeshError> {
        let base = vertex_at(vertex_map, chip_path, template.base().id())?;
        let input = vertex_at(vertex_map, chip_path, template.signal_input().id())?;
        let output = vertex_at(vertex_map, chip_path, template.signal_output().id())?;

        let seed = config.connectors.len() as u64;
        let connector = Connector::new(base.clone(), template.active_low(), seed);
        input.add_edge(Edge::new(output.clone(), connector.clone()));
        config.connectors.push(connector);

        let mut simulated = SimulatedDesign::default();
        simulated.pins.insert(template.base().id(), base);
        simulated.pins.insert(template.signal_input().id(), input);
        simulated.pins.insert(template.signal_output().id(), output);
        Ok(Arc::new(simulated))
    }

    fn bind_builtin(
        &mut self,
        chip: &Chip,
        chip_path: PathId,
        template: &Arc<BuiltinTemplate>,
        vertex_map: &IndexMap<MeshPin, Arc<Vertex>>,
        config: &mut SimulationConfig,
    ) -> Result<Arc<SimulatedDesign>, MeshError> {
        let mut simulated = SimulatedDesign::default();

        let mut inputs = Vec::with_capacity(template.input_pins().len());
        for pin in template.input_pins() {
            let vertex = vertex_at(vertex_map, chip_path, pin.id())?;
            simulated.pins.insert(pin.id(), vertex.clone());
            inputs.push((pin.id(), vertex));
        }

        let mut outputs = Vec::with_capacity(template.output_pins().len());
        for pin in template.output_pins() {
            let vertex = vertex_at(vertex_map, chip_path, pin.id())?;
            simulated.pins.insert(pin.id(), vertex.clone());
            outputs.push((pin.id(), vertex));
        }

        config.functions.push(Arc::new(Function::new(
            chip.id(),
            chip.name(),
            template.clone(),
            inputs,
            outputs,
        )));
        Ok(Arc::new(simulated))
    }

    /// Pass 3: rebuild the hierarchy as a simulated-design tree and
    /// create the gating structures for primitive chips.
    fn assemble_level(
        &mut self,
        level: PathId,
        design: &Design,
        vertex_map: &IndexMap<MeshPin, Arc<Vertex>>,
        config: &mut SimulationConfig,
    ) -> Result<Arc<SimulatedDesign>, MeshError> {
        let mut simulated = SimulatedDesign::default();

        for pin in design.pins() {
            let vertex = vertex_at(vertex_map, level, pin.id())?;
            simulated.pins.insert(pin.id(), vertex);
        }

        // Wire nodes and segments take the vertex of any pin in their
        // wire set; connectivity guarantees every pin in the set maps to
        // the same vertex. A pin-less set (floating wire) still gets its
        // own vertex so it renders a state.
        let sets = self.wire_sets.shift_remove(&level).unwrap_or_default();
        for set in sets {
            let vertex = match set.pins.first() {
                Some(mesh_pin) => vertex_map
                    .get(mesh_pin)
                    .cloned()
                    .ok_or(MeshError::UnboundPin { pin: mesh_pin.pin })?,
                None => {
                    let vertex = Vertex::new();
                    config.vertices.push(vertex.clone());
                    vertex
                }
            };
            for node in set.nodes {
                simulated.nodes.insert(node, vertex.clone());
            }
            for segment in set.segments {
                simulated.segments.insert(segment, vertex.clone());
            }
        }

        for chip in design.chips() {
            let chip_path = self.paths.child(level, chip.id());
            let child = match chip.template() {
                ChipTemplate::Transistor(template) => {
                    self.bind_transistor(chip_path, template, vertex_map, config)?
                }
                ChipTemplate::Builtin(template) => {
                    self.bind_builtin(chip, chip_path, template, vertex_map, config)?
                }
                ChipTemplate::Composite(inner) => {
                    self.assemble_level(chip_path, inner, vertex_map, config)?
                }
            };
            simulated.children.insert(chip.id(), child);
        }

        Ok(Arc::new(simulated))
    }
}

/// Collapse a circuit into a [`SimulationConfig`].
///
/// Deterministic for a fixed design: all traversal follows insertion
/// order. Vertex identity is only meaningful within the returned config
/// — rebuilding the same design yields equivalent but distinct
/// vertices.
///
/// # Errors
///
/// Returns a [`MeshError`] when the design's topology is malformed: a
/// segment endpoint naming a chip absent from its level, or a gating
/// structure referring to a pin no vertex was built for.
pub fn build(design: &Design) -> Result<SimulationConfig, MeshError> {
    info!(
        transistors = design.transistor_count(),
        "generating mesh for top-level design"
    );

    let mut generation = Generation::default();
    let root = generation.paths.root();
    generation.collect_level(root, design)?;

    let mut config = SimulationConfig::default();
    let vertex_map = generation.build_vertices(&mut config);
    let top = generation.assemble_level(root, design, &vertex_map, &mut config)?;
    config.root = top;

    info!(
        vertices = config.vertices.len(),
        connectors = config.connectors.len(),
        functions = config.functions.len(),
        "generated mesh for top-level design"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::Pin;

    #[test]
    fn path_arena_interns_equal_paths_once() {
        let mut arena = PathArena::default();
        let root = arena.root();
        let chip = ChipId::next();
        let a = arena.child(root, chip);
        let b = arena.child(root, chip);
        assert_eq!(a, b);
        assert_ne!(a, root);
    }

    #[test]
    fn isolated_pin_gets_a_singleton_vertex() {
        let mut design = Design::new();
        design.add_pin(Pin::new("floating"));
        let config = build(&design).unwrap();
        assert_eq!(config.vertices().len(), 1);
    }

    #[test]
    fn chained_segments_collapse_to_one_vertex() {
        let mut design = Design::new();
        let a = design.add_pin(Pin::new("a"));
        let b = design.add_pin(Pin::new("b"));
        let c = design.add_pin(Pin::new("c"));
        design.add_segment(WireEnd::design_pin(a), WireEnd::design_pin(b));
        design.add_segment(WireEnd::design_pin(b), WireEnd::design_pin(c));

        let config = build(&design).unwrap();
        assert_eq!(config.vertices().len(), 1);

        let root = config.root();
        let va = root.vertex_for_pin(a).unwrap().id();
        let vb = root.vertex_for_pin(b).unwrap().id();
        let vc = root.vertex_for_pin(c).unwrap().id();
        assert_eq!(va, vb);
        assert_eq!(vb, vc);
    }

    #[test]
    fn unwired_pins_stay_apart() {
        let mut design = Design::new();
        let a = design.add_pin(Pin::new("a"));
        let b = design.add_pin(Pin::new("b"));

        let config = build(&design).unwrap();
        assert_eq!(config.vertices().len(), 2);
        let root = config.root();
        assert_ne!(
            root.vertex_for_pin(a).unwrap().id(),
            root.vertex_for_pin(b).unwrap().id()
        );
    }

    #[test]
    fn wires_through_nodes_join_pins() {
        let mut design = Design::new();
        let a = design.add_pin(Pin::new("a"));
        let b = design.add_pin(Pin::new("b"));
        let node = design.add_node();
        design.add_segment(WireEnd::design_pin(a), WireEnd::node(node));
        design.add_segment(WireEnd::node(node), WireEnd::design_pin(b));

        let config = build(&design).unwrap();
        assert_eq!(config.vertices().len(), 1);

        // The node and both segments map to the same net as the pins.
        let root = config.root();
        let pin_vertex = root.vertex_for_pin(a).unwrap().id();
        assert_eq!(root.nodes[&node].id(), pin_vertex);
        for vertex in root.segments.values() {
            assert_eq!(vertex.id(), pin_vertex);
        }
        assert_eq!(root.segments.len(), 2);
    }

    #[test]
    fn floating_wire_gets_its_own_vertex() {
        let mut design = Design::new();
        let n1 = design.add_node();
        let n2 = design.add_node();
        design.add_segment(WireEnd::node(n1), WireEnd::node(n2));

        let config = build(&design).unwrap();
        assert_eq!(config.vertices().len(), 1);
    }

    #[test]
    fn dangling_chip_reference_fails_generation() {
        let mut design = Design::new();
        let a = design.add_pin(Pin::new("a"));
        let ghost = ChipId::next();
        design.add_segment(WireEnd::design_pin(a), WireEnd::chip_pin(ghost, PinId::next()));

        assert!(matches!(
            build(&design),
            Err(MeshError::DanglingEndpoint { chip, .. }) if chip == ghost
        ));
    }

    #[test]
    fn transistor_registers_one_connector() {
        let mut design = Design::new();
        let template = TransistorTemplate::npn();
        design.add_chip(Chip::new("q1", ChipTemplate::Transistor(template)));

        let config = build(&design).unwrap();
        assert_eq!(config.connectors().len(), 1);
        assert_eq!(config.vertices().len(), 3);
    }
}
