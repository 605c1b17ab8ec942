// SPDX-License-Identifier: MIT OR Apache-2.0
//! Pose resolution over a frame graph.
//!
//! A query names a source and a target frame. The resolver finds a path
//! between their vertices with a breadth-first search that ignores edge
//! orientation, then composes the payloads met along the way:
//!
//! - moving from a reference frame to its child applies the child's payload
//! - moving from a child to its reference frame applies the inverse
//!
//! Which end of an edge is the child is carried by its [`EdgeDirection`].
//!
//! [`EdgeDirection`]: crate::edge::EdgeDirection

use crate::edge::{Edge, EdgeId};
use crate::graph::{FrameGraph, GraphError};
use crate::math::{Matrix4, Pose};
use crate::vertex::VertexId;
use std::collections::{HashMap, HashSet, VecDeque};

/// One hop of a resolved path
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    /// Vertex the hop leaves
    pub from: VertexId,
    /// Vertex the hop arrives at
    pub to: VertexId,
    /// Edge traversed
    pub edge: EdgeId,
}

/// Pose of frame `source` expressed in frame `target`.
///
/// Names shared by several vertices resolve to the first inserted one.
/// Both names must be present, even when they are equal.
pub fn pose_in_frame(source: &str, target: &str, graph: &FrameGraph) -> Result<Pose, ResolveError> {
    let source_id = resolve_first(graph, source)?;
    let target_id = resolve_first(graph, target)?;
    if source == target {
        return Ok(Pose::IDENTITY);
    }

    pose_between(source_id, target_id, graph)
}

/// Pose of vertex `source` expressed in vertex `target`
pub fn pose_between(
    source: VertexId,
    target: VertexId,
    graph: &FrameGraph,
) -> Result<Pose, ResolveError> {
    let source_name = graph.vertex_from_id(source)?.name();
    let target_name = graph.vertex_from_id(target)?.name();

    if source == target {
        return Ok(Pose::IDENTITY);
    }

    let path = find_path(source, target, graph).ok_or_else(|| ResolveError::NoPath {
        source_frame: source_name.to_string(),
        target_frame: target_name.to_string(),
    })?;

    // The composed chain locates the target in the source frame
    let target_in_source = compose_path(&path, graph)?;
    Ok(target_in_source.rigid_inverse().to_pose())
}

/// Breadth-first search from `source` to `target`, following edges in
/// either orientation. Neighbours are visited in edge insertion order.
pub fn find_path(source: VertexId, target: VertexId, graph: &FrameGraph) -> Option<Vec<Step>> {
    if source == target {
        return Some(Vec::new());
    }

    // Built once so each dequeue only touches its own edges
    let mut neighbours: HashMap<VertexId, Vec<&Edge>> = HashMap::new();
    for edge in graph.edges() {
        neighbours.entry(edge.from).or_default().push(edge);
        if edge.to != edge.from {
            neighbours.entry(edge.to).or_default().push(edge);
        }
    }

    let mut visited = HashSet::from([source]);
    let mut arrived_by: HashMap<VertexId, Step> = HashMap::new();
    let mut queue = VecDeque::from([source]);

    while let Some(current) = queue.pop_front() {
        let Some(edges) = neighbours.get(&current) else {
            continue;
        };
        for edge in edges {
            let Some(next) = edge.opposite(current) else {
                continue;
            };
            if !visited.insert(next) {
                continue;
            }

            arrived_by.insert(
                next,
                Step {
                    from: current,
                    to: next,
                    edge: edge.id,
                },
            );

            if next == target {
                return Some(unwind(&arrived_by, source, target));
            }
            queue.push_back(next);
        }
    }

    None
}

/// Compose the payloads along a path, giving the last vertex's pose in the
/// first vertex's frame as a matrix
pub fn compose_path(path: &[Step], graph: &FrameGraph) -> Result<Matrix4, ResolveError> {
    let mut result = Matrix4::IDENTITY;

    for step in path {
        let edge = graph
            .edge(step.edge)
            .ok_or(GraphError::EdgeNotFound(step.edge))?;
        let child = edge.child();
        let payload = *graph.vertex_from_id(child)?.data();

        result = if step.to == child {
            result * payload
        } else {
            result * payload.rigid_inverse()
        };
    }

    Ok(result)
}

fn resolve_first(graph: &FrameGraph, name: &str) -> Result<VertexId, ResolveError> {
    let matches = graph.vertices(name);
    if matches.len() > 1 {
        tracing::debug!(
            "Frame name '{}' matches {} vertices, using the first inserted",
            name,
            matches.len()
        );
    }

    matches
        .first()
        .map(|(id, _)| *id)
        .ok_or_else(|| ResolveError::NotFound(name.to_string()))
}

fn unwind(arrived_by: &HashMap<VertexId, Step>, source: VertexId, target: VertexId) -> Vec<Step> {
    let mut path = Vec::new();
    let mut current = target;
    while current != source {
        let Some(step) = arrived_by.get(&current) else {
            break;
        };
        path.push(*step);
        current = step.from;
    }
    path.reverse();
    path
}

/// Error resolving a pose
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// No vertex carries the frame name
    #[error("Frame not found: '{0}'")]
    NotFound(String),

    /// The frames are in disconnected parts of the graph
    #[error("No path from frame '{source_frame}' to frame '{target_frame}'")]
    NoPath {
        /// Source frame name
        source_frame: String,
        /// Target frame name
        target_frame: String,
    },

    /// Graph lookup failed while composing
    #[error(transparent)]
    Graph(#[from] GraphError),
}
