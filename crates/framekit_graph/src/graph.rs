// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame graph containing vertices (frames) and kinematic edges.

use crate::edge::{Edge, EdgeDirection, EdgeId};
use crate::math::Matrix4;
use crate::vertex::{Vertex, VertexId};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Frame graph shared by every entity of one document
pub type SharedFrameGraph = Arc<RwLock<FrameGraph>>;

/// Vertices registered under one name, in insertion order
pub type VertexRefs<'a> = Vec<(VertexId, &'a Vertex)>;

/// How to pick a vertex when several share a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// Use the earliest inserted vertex
    FirstInserted,
    /// Fail unless exactly one vertex has the name
    Unique,
}

/// A directed graph of named coordinate frames
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameGraph {
    /// Vertices in insertion order
    vertices: IndexMap<VertexId, Vertex>,
    /// Edges in insertion order
    edges: IndexMap<EdgeId, Edge>,
    /// Implicit root frame, if created with one
    root: Option<VertexId>,
}

impl FrameGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph holding an implicit root frame with identity payload
    pub fn with_root(name: impl Into<String>) -> Self {
        let mut graph = Self::new();
        let root = graph.add_vertex(name, Matrix4::IDENTITY).id();
        graph.root = Some(root);
        graph
    }

    /// Wrap the graph for sharing between entities
    pub fn into_shared(self) -> SharedFrameGraph {
        Arc::new(RwLock::new(self))
    }

    /// Root frame ID
    pub fn root(&self) -> Option<VertexId> {
        self.root
    }

    /// Current name of the root frame
    pub fn root_name(&self) -> Option<&str> {
        self.root
            .and_then(|id| self.vertices.get(&id))
            .map(Vertex::name)
    }

    /// Add a vertex. Names need not be unique.
    pub fn add_vertex(&mut self, name: impl Into<String>, data: Matrix4) -> &Vertex {
        let vertex = Vertex::new(name, data);
        let id = vertex.id();
        tracing::debug!("Adding frame vertex '{}' ({})", vertex.name(), id);
        self.vertices.entry(id).or_insert(vertex)
    }

    /// Add a directed edge. Fails without mutation if either vertex is absent.
    pub fn add_edge(
        &mut self,
        (from, to): (VertexId, VertexId),
        direction: EdgeDirection,
    ) -> Result<EdgeId, GraphError> {
        self.ensure_vertex(from)?;
        self.ensure_vertex(to)?;

        let edge = Edge::new(from, to, direction);
        let id = edge.id;
        self.edges.insert(id, edge);
        Ok(id)
    }

    /// Add the complementary edge pair between a reference frame and a
    /// frame expressed relative to it.
    ///
    /// Both ids are checked before either edge is inserted.
    pub fn add_edge_pair(
        &mut self,
        reference: VertexId,
        child: VertexId,
    ) -> Result<(EdgeId, EdgeId), GraphError> {
        self.ensure_vertex(reference)?;
        self.ensure_vertex(child)?;

        let down = self.add_edge((reference, child), EdgeDirection::Backward)?;
        let up = self.add_edge((child, reference), EdgeDirection::Forward)?;
        Ok((down, up))
    }

    /// All vertices registered under `name`, in insertion order
    pub fn vertices(&self, name: &str) -> VertexRefs<'_> {
        self.vertices
            .iter()
            .filter(|(_, v)| v.name() == name)
            .map(|(id, v)| (*id, v))
            .collect()
    }

    /// Resolve a name to a single vertex using an explicit tie-break policy
    pub fn resolve_name(&self, name: &str, tie_break: TieBreak) -> Result<VertexId, GraphError> {
        let matches = self.vertices(name);
        match (matches.as_slice(), tie_break) {
            ([], _) => Err(GraphError::NameNotFound(name.to_string())),
            ([(id, _)], _) => Ok(*id),
            ([(id, _), ..], TieBreak::FirstInserted) => Ok(*id),
            (_, TieBreak::Unique) => Err(GraphError::AmbiguousName {
                name: name.to_string(),
                count: matches.len(),
            }),
        }
    }

    /// Get a vertex by ID
    pub fn vertex_from_id(&self, id: VertexId) -> Result<&Vertex, GraphError> {
        self.vertices.get(&id).ok_or(GraphError::VertexNotFound(id))
    }

    /// Get a mutable vertex by ID
    pub fn vertex_from_id_mut(&mut self, id: VertexId) -> Result<&mut Vertex, GraphError> {
        self.vertices
            .get_mut(&id)
            .ok_or(GraphError::VertexNotFound(id))
    }

    /// Check if a vertex exists
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.vertices.contains_key(&id)
    }

    /// Get all vertices
    pub fn all_vertices(&self) -> impl Iterator<Item = &Vertex> {
        self.vertices.values()
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get an edge by ID
    pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
        self.edges.get(&id)
    }

    /// Get all edges
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.values()
    }

    /// Get the first edge running `from -> to`
    pub fn edge_between(&self, from: VertexId, to: VertexId) -> Option<&Edge> {
        self.edges.values().find(|e| e.from == from && e.to == to)
    }

    /// Get edges leaving a vertex
    pub fn edges_from(&self, id: VertexId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.from == id)
    }

    /// Get edges entering a vertex
    pub fn edges_to(&self, id: VertexId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.to == id)
    }

    /// Get edges touching a vertex in either orientation
    pub fn edges_for_vertex(&self, id: VertexId) -> impl Iterator<Item = &Edge> {
        self.edges.values().filter(move |e| e.involves_vertex(id))
    }

    /// Get the number of edges
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    fn ensure_vertex(&self, id: VertexId) -> Result<(), GraphError> {
        if self.vertices.contains_key(&id) {
            Ok(())
        } else {
            Err(GraphError::VertexNotFound(id))
        }
    }
}

/// Error from a frame graph query or mutation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// Vertex ID is not in the graph
    #[error("Vertex not found: {0}")]
    VertexNotFound(VertexId),

    /// Edge ID is not in the graph
    #[error("Edge not found: {0:?}")]
    EdgeNotFound(EdgeId),

    /// No vertex has the name
    #[error("No frame named '{0}'")]
    NameNotFound(String),

    /// Several vertices share the name and a unique match was required
    #[error("Frame name '{name}' is ambiguous ({count} vertices)")]
    AmbiguousName {
        /// The requested name
        name: String,
        /// Number of vertices under the name
        count: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Pose;

    #[test]
    fn test_duplicate_names_are_kept_in_insertion_order() {
        let mut graph = FrameGraph::new();
        let first = graph.add_vertex("link", Matrix4::IDENTITY).id();
        let second = graph.add_vertex("link", Matrix4::IDENTITY).id();
        graph.add_vertex("other", Matrix4::IDENTITY);

        let matches = graph.vertices("link");
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].0, first);
        assert_eq!(matches[1].0, second);
        assert!(graph.vertices("missing").is_empty());
    }

    #[test]
    fn test_resolve_name_tie_break() {
        let mut graph = FrameGraph::new();
        let first = graph.add_vertex("a", Matrix4::IDENTITY).id();
        graph.add_vertex("a", Matrix4::IDENTITY);

        assert_eq!(graph.resolve_name("a", TieBreak::FirstInserted), Ok(first));
        assert_eq!(
            graph.resolve_name("a", TieBreak::Unique),
            Err(GraphError::AmbiguousName {
                name: "a".to_string(),
                count: 2
            })
        );
        assert_eq!(
            graph.resolve_name("b", TieBreak::FirstInserted),
            Err(GraphError::NameNotFound("b".to_string()))
        );
    }

    #[test]
    fn test_add_edge_rejects_unknown_vertex() {
        let mut graph = FrameGraph::new();
        let known = graph.add_vertex("known", Matrix4::IDENTITY).id();
        let stale = VertexId::new();

        let result = graph.add_edge((known, stale), EdgeDirection::Forward);
        assert_eq!(result, Err(GraphError::VertexNotFound(stale)));
        assert_eq!(graph.edge_count(), 0);

        let result = graph.add_edge_pair(stale, known);
        assert!(result.is_err());
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_edge_pair() {
        let mut graph = FrameGraph::new();
        let reference = graph.add_vertex("base", Matrix4::IDENTITY).id();
        let child = graph.add_vertex("arm", Matrix4::IDENTITY).id();

        let (down, up) = graph.add_edge_pair(reference, child).unwrap();
        assert_eq!(graph.edge(down).unwrap().direction, EdgeDirection::Backward);
        assert_eq!(graph.edge(up).unwrap().direction, EdgeDirection::Forward);
        assert!(graph.edge_between(reference, child).is_some());
        assert!(graph.edge_between(child, reference).is_some());
        assert_eq!(graph.edges_for_vertex(child).count(), 2);
        assert_eq!(graph.edges_from(reference).count(), 1);
        assert_eq!(graph.edges_to(reference).count(), 1);
    }

    #[test]
    fn test_rename_vertex() {
        let mut graph = FrameGraph::new();
        let id = graph.add_vertex("old", Matrix4::IDENTITY).id();

        graph.vertex_from_id_mut(id).unwrap().set_name("new");

        assert!(graph.vertices("old").is_empty());
        let matches = graph.vertices("new");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0, id);
    }

    #[test]
    fn test_stale_id_is_detected() {
        let graph = FrameGraph::with_root("__model__");
        let stale = VertexId::new();
        assert_eq!(
            graph.vertex_from_id(stale).err(),
            Some(GraphError::VertexNotFound(stale))
        );
        assert_eq!(graph.root_name(), Some("__model__"));
        assert_eq!(graph.vertex_count(), 1);
    }

    #[test]
    fn test_serialization() {
        let mut graph = FrameGraph::with_root("world");
        let root = graph.root().unwrap();
        let pose = Pose::from_array([1.0, 0.0, 0.0, 0.0, 0.0, 0.5]);
        let child = graph.add_vertex("child", Matrix4::from(pose)).id();
        graph.add_edge_pair(root, child).unwrap();

        let text = ron::to_string(&graph).unwrap();
        let loaded: FrameGraph = ron::from_str(&text).unwrap();
        assert_eq!(loaded.vertex_count(), 2);
        assert_eq!(loaded.edge_count(), 2);
        assert!(loaded.vertex_from_id(child).unwrap().pose().approx_eq(&pose, 1e-9));
    }
}
