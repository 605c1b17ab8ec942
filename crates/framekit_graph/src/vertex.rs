// SPDX-License-Identifier: MIT OR Apache-2.0
//! Vertex (frame) definitions for the frame graph.

use crate::math::{Matrix4, Pose};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for a vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VertexId(pub Uuid);

impl VertexId {
    /// Create a new random vertex ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VertexId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A named coordinate frame in the graph.
///
/// The id is fixed at creation; the name and transform may change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vertex {
    id: VertexId,
    name: String,
    data: Matrix4,
}

impl Vertex {
    /// Create a vertex with a fresh id
    pub fn new(name: impl Into<String>, data: Matrix4) -> Self {
        Self {
            id: VertexId::new(),
            name: name.into(),
            data,
        }
    }

    /// Vertex ID
    pub fn id(&self) -> VertexId {
        self.id
    }

    /// Frame name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Rename the frame
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Transform payload
    pub fn data(&self) -> &Matrix4 {
        &self.data
    }

    /// Replace the transform payload
    pub fn set_data(&mut self, data: Matrix4) {
        self.data = data;
    }

    /// Payload decomposed into a pose
    pub fn pose(&self) -> Pose {
        self.data.to_pose()
    }
}
