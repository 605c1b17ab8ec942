// SPDX-License-Identifier: MIT OR Apache-2.0
//! Kinematic edge definitions for the frame graph.

use crate::vertex::VertexId;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub Uuid);

impl EdgeId {
    /// Create a new random edge ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EdgeId {
    fn default() -> Self {
        Self::new()
    }
}

/// Signed direction marker of an edge.
///
/// Edges are created in pairs between a reference frame and the frame
/// expressed relative to it (the child):
/// - `Backward` (-1) runs reference -> child
/// - `Forward` (+1) runs child -> reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EdgeDirection {
    /// +1, from the child toward its reference frame
    Forward,
    /// -1, from the reference frame toward the child
    Backward,
}

impl EdgeDirection {
    /// Numeric sign of the direction
    pub fn sign(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }

    /// Direction from a numeric sign (`0` has no direction)
    pub fn from_sign(sign: i8) -> Option<Self> {
        match sign.signum() {
            1 => Some(Self::Forward),
            -1 => Some(Self::Backward),
            _ => None,
        }
    }

    /// Direction of the complementary edge
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

/// A directed edge between two frames
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    /// Unique edge ID
    pub id: EdgeId,
    /// Source vertex
    pub from: VertexId,
    /// Destination vertex
    pub to: VertexId,
    /// Direction marker
    pub direction: EdgeDirection,
}

impl Edge {
    /// Create a new edge
    pub fn new(from: VertexId, to: VertexId, direction: EdgeDirection) -> Self {
        Self {
            id: EdgeId::new(),
            from,
            to,
            direction,
        }
    }

    /// Check if this edge touches a vertex
    pub fn involves_vertex(&self, vertex_id: VertexId) -> bool {
        self.from == vertex_id || self.to == vertex_id
    }

    /// The endpoint opposite `vertex_id`, if the edge touches it
    pub fn opposite(&self, vertex_id: VertexId) -> Option<VertexId> {
        if self.from == vertex_id {
            Some(self.to)
        } else if self.to == vertex_id {
            Some(self.from)
        } else {
            None
        }
    }

    /// The endpoint whose payload is expressed relative to the other one
    pub fn child(&self) -> VertexId {
        match self.direction {
            EdgeDirection::Backward => self.to,
            EdgeDirection::Forward => self.from,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_sign() {
        assert_eq!(EdgeDirection::Forward.sign(), 1);
        assert_eq!(EdgeDirection::Backward.sign(), -1);
        assert_eq!(EdgeDirection::from_sign(-3), Some(EdgeDirection::Backward));
        assert_eq!(EdgeDirection::from_sign(0), None);
        assert_eq!(EdgeDirection::Forward.reversed(), EdgeDirection::Backward);
    }

    #[test]
    fn test_child_side_follows_direction() {
        let reference = VertexId::new();
        let child = VertexId::new();

        let down = Edge::new(reference, child, EdgeDirection::Backward);
        let up = Edge::new(child, reference, EdgeDirection::Forward);

        assert_eq!(down.child(), child);
        assert_eq!(up.child(), child);
        assert_eq!(down.opposite(reference), Some(child));
        assert_eq!(down.opposite(VertexId::new()), None);
    }
}
