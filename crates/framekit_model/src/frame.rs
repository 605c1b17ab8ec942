// SPDX-License-Identifier: MIT OR Apache-2.0
//! An entity's frame in a frame graph.
//!
//! Every loaded entity owns one vertex. [`FrameBinding`] keeps the graph
//! handle and the vertex id together and is the only place entities touch
//! the graph.

use crate::error::{Diagnostic, Diagnostics, ErrorCode, PoseError};
use framekit_graph::{
    pose_between, FrameGraph, GraphError, Matrix4, Pose, ResolveError, SharedFrameGraph,
    TieBreak, VertexId,
};
use std::sync::Arc;

/// Handle to an entity's vertex
#[derive(Debug, Clone)]
pub struct FrameBinding {
    graph: SharedFrameGraph,
    vertex: VertexId,
    /// Whether `graph` is a document graph rather than a private one
    attached: bool,
}

impl Default for FrameBinding {
    fn default() -> Self {
        Self::detached("", &Pose::IDENTITY)
    }
}

impl FrameBinding {
    /// Binding to a private graph that holds only this frame.
    ///
    /// The name and pose can be read and changed, but pose queries fail
    /// with [`PoseError::NoFrameGraph`].
    pub fn detached(name: &str, pose: &Pose) -> Self {
        let mut graph = FrameGraph::new();
        let vertex = graph.add_vertex(name, Matrix4::from(pose)).id();
        Self {
            graph: graph.into_shared(),
            vertex,
            attached: false,
        }
    }

    /// Insert a vertex for an entity into a shared graph and wire it to the
    /// vertex registered under `reference`.
    ///
    /// The vertex is always inserted. Lookup problems are recorded in
    /// `diagnostics` and leave the vertex without edges.
    pub fn attach(
        graph: &SharedFrameGraph,
        name: &str,
        pose: &Pose,
        reference: &str,
        tie_break: TieBreak,
        entity_kind: &str,
        diagnostics: &mut Diagnostics,
    ) -> Self {
        let mut guard = graph.write();

        // Resolve before inserting so the new vertex never matches itself
        let reference_id = guard.resolve_name(reference, tie_break);
        let candidates = guard.vertices(reference).len();
        let vertex = guard.add_vertex(name, Matrix4::from(pose)).id();

        match reference_id {
            Ok(reference_id) => {
                if candidates > 1 {
                    tracing::warn!(
                        "{} '{}' references frame '{}', which names {} vertices; using the first",
                        entity_kind,
                        name,
                        reference,
                        candidates
                    );
                }
                if let Err(e) = guard.add_edge_pair(reference_id, vertex) {
                    diagnostics.push(Diagnostic::new(
                        ErrorCode::FrameGraphError,
                        format!("Unable to connect {entity_kind} [{name}] to frame [{reference}]: {e}"),
                    ));
                }
            }
            Err(GraphError::AmbiguousName { count, .. }) => {
                diagnostics.push(Diagnostic::new(
                    ErrorCode::FrameGraphError,
                    format!(
                        "The {entity_kind} [{name}] references frame [{reference}], \
                         which is shared by {count} frames."
                    ),
                ));
            }
            Err(_) => {
                diagnostics.push(Diagnostic::new(
                    ErrorCode::FrameGraphError,
                    format!(
                        "The {entity_kind} [{name}] references frame [{reference}], \
                         which is not in the frame graph."
                    ),
                ));
            }
        }

        Self {
            graph: Arc::clone(graph),
            vertex,
            attached: true,
        }
    }

    /// Whether the binding lives in a document graph
    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// ID of the entity's vertex
    pub fn vertex_id(&self) -> VertexId {
        self.vertex
    }

    /// The document graph, if attached
    pub fn graph(&self) -> Option<&SharedFrameGraph> {
        self.attached.then_some(&self.graph)
    }

    /// Current frame name
    pub fn name(&self) -> String {
        self.graph
            .read()
            .vertex_from_id(self.vertex)
            .map(|v| v.name().to_string())
            .unwrap_or_default()
    }

    /// Rename the frame
    pub fn set_name(&self, name: &str) -> Result<(), GraphError> {
        self.graph
            .write()
            .vertex_from_id_mut(self.vertex)?
            .set_name(name);
        Ok(())
    }

    /// Replace the frame's transform
    pub fn set_pose(&self, pose: &Pose) -> Result<(), GraphError> {
        self.graph
            .write()
            .vertex_from_id_mut(self.vertex)?
            .set_data(Matrix4::from(pose));
        Ok(())
    }

    /// Pose of this frame expressed in `frame`
    pub fn pose_in_frame(&self, frame: &str) -> Result<Pose, PoseError> {
        if !self.attached {
            return Err(PoseError::NoFrameGraph(self.name()));
        }

        let graph = self.graph.read();
        if graph.vertex_from_id(self.vertex)?.name() == frame {
            return Ok(Pose::IDENTITY);
        }

        let target = graph
            .resolve_name(frame, TieBreak::FirstInserted)
            .map_err(|_| ResolveError::NotFound(frame.to_string()))?;
        Ok(pose_between(self.vertex, target, &graph)?)
    }
}
