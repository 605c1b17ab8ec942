// SPDX-License-Identifier: MIT OR Apache-2.0
//! Links: the rigid bodies that joints connect.

use crate::element::ElementPtr;
use crate::error::{Diagnostic, Diagnostics, ErrorCode, PoseError};
use crate::frame::FrameBinding;
use crate::settings::DEFAULT_ROOT_FRAME;
use crate::utils::{is_reserved_name, load_name, load_pose};
use framekit_graph::{Pose, SharedFrameGraph, TieBreak};

/// A link loaded from a `<link>` element
#[derive(Debug, Clone, Default)]
pub struct Link {
    pose: Pose,
    pose_frame: String,
    frame: FrameBinding,
    element: Option<ElementPtr>,
}

impl Link {
    /// Create an unloaded link with a private frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a `<link>` element.
    ///
    /// The link's pose is expressed in its pose frame, which defaults to the
    /// graph's root frame. The new vertex is wired to that frame.
    pub fn load(&mut self, element: ElementPtr, graph: Option<&SharedFrameGraph>) -> Diagnostics {
        self.load_with_tie_break(element, graph, TieBreak::FirstInserted)
    }

    /// Load with an explicit policy for resolving the pose frame name
    pub fn load_with_tie_break(
        &mut self,
        element: ElementPtr,
        graph: Option<&SharedFrameGraph>,
        tie_break: TieBreak,
    ) -> Diagnostics {
        let mut errors = Diagnostics::new();
        *self = Self::default();
        self.element = Some(element.clone());

        if element.kind != "link" {
            errors.push(Diagnostic::new(
                ErrorCode::ElementIncorrectType,
                "Attempting to load a Link, but the provided element is not a <link>.",
            ));
            return errors;
        }

        let name = load_name(&element).unwrap_or_else(|| {
            errors.push(Diagnostic::new(
                ErrorCode::AttributeMissing,
                "A link name is required, but the name is not set.",
            ));
            String::new()
        });

        if is_reserved_name(&name) {
            errors.push(Diagnostic::new(
                ErrorCode::ReservedName,
                format!("The supplied link name [{name}] is reserved."),
            ));
        }

        if let Some((pose, frame)) = load_pose(&element) {
            self.pose = pose;
            self.pose_frame = frame;
        }
        if self.pose_frame.is_empty() {
            self.pose_frame = graph
                .and_then(|g| g.read().root_name().map(str::to_string))
                .unwrap_or_else(|| DEFAULT_ROOT_FRAME.to_string());
        }

        match graph {
            Some(graph) => {
                self.frame = FrameBinding::attach(
                    graph,
                    &name,
                    &self.pose,
                    &self.pose_frame,
                    tie_break,
                    "link",
                    &mut errors,
                );
            }
            None => {
                self.frame = FrameBinding::detached(&name, &self.pose);
                errors.push(Diagnostic::new(
                    ErrorCode::FunctionArgumentMissing,
                    "A frame graph is required to compute pose information.",
                ));
            }
        }

        errors
    }

    /// Link name, read from its frame
    pub fn name(&self) -> String {
        self.frame.name()
    }

    /// Rename the link's frame
    pub fn set_name(&mut self, name: &str) {
        if let Err(e) = self.frame.set_name(name) {
            tracing::error!("Failed to rename link frame: {}", e);
        }
    }

    /// Local pose
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Set the local pose, keeping the frame graph in step
    pub fn set_pose(&mut self, pose: Pose) {
        if let Err(e) = self.frame.set_pose(&pose) {
            tracing::error!("Failed to update link frame pose: {}", e);
        }
        self.pose = pose;
    }

    /// Frame the local pose is expressed in
    pub fn pose_frame(&self) -> &str {
        &self.pose_frame
    }

    /// Set the pose frame. Empty names are rejected.
    ///
    /// Only the recorded name changes; the frame graph keeps the edges made
    /// at load.
    pub fn set_pose_frame(&mut self, frame: impl Into<String>) -> bool {
        let frame = frame.into();
        if frame.is_empty() {
            return false;
        }
        self.pose_frame = frame;
        true
    }

    /// Pose of the link expressed in `frame` (empty means the pose frame)
    pub fn pose_in_frame(&self, frame: &str) -> Result<Pose, PoseError> {
        let frame = if frame.is_empty() {
            self.pose_frame.as_str()
        } else {
            frame
        };
        self.frame.pose_in_frame(frame)
    }

    /// The link's frame binding
    pub fn frame(&self) -> &FrameBinding {
        &self.frame
    }

    /// The element this link was loaded from
    pub fn element(&self) -> Option<&ElementPtr> {
        self.element.as_ref()
    }
}
