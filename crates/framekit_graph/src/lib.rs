// SPDX-License-Identifier: MIT OR Apache-2.0
//! Frame graph and pose resolution for framekit.
//!
//! This crate knows nothing about joints, links or documents. It provides:
//! - A directed graph of named coordinate frames ([`FrameGraph`])
//! - Signed kinematic edges, created in reference/child pairs
//! - Rigid transform math ([`Pose`], [`Matrix4`])
//! - A resolver answering "pose of A expressed in B" ([`pose_in_frame`])
//!
//! ## Sharing
//!
//! All entities of one document hold the same [`SharedFrameGraph`] and
//! remember only the [`VertexId`] of their own frame.

pub mod vertex;
pub mod edge;
pub mod graph;
pub mod math;
pub mod resolver;

pub use edge::{Edge, EdgeDirection, EdgeId};
pub use graph::{FrameGraph, GraphError, SharedFrameGraph, TieBreak, VertexRefs};
pub use math::{Matrix4, Pose};
pub use resolver::{pose_between, pose_in_frame, ResolveError};
pub use vertex::{Vertex, VertexId};
