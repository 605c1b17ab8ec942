// SPDX-License-Identifier: MIT OR Apache-2.0
//! Joints connecting a parent link to a child link.
//!
//! Loading a joint inserts one vertex (named after the joint, carrying its
//! pose) into the document's frame graph and wires it to the parent link's
//! frame with a complementary edge pair.

use crate::element::ElementPtr;
use crate::error::{Diagnostic, Diagnostics, ErrorCode, PoseError};
use crate::frame::FrameBinding;
use crate::joint_axis::JointAxis;
use crate::settings::DEFAULT_ROOT_FRAME;
use crate::utils::{load_name, load_pose};
use framekit_graph::{Pose, SharedFrameGraph, TieBreak};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum JointType {
    /// Not set, or set to an unrecognized value
    #[default]
    Invalid,
    /// Three rotational degrees of freedom
    Ball,
    /// Unlimited hinge
    Continuous,
    /// No degrees of freedom
    Fixed,
    /// Geared pair of revolute axes
    Gearbox,
    /// Sliding along one axis
    Prismatic,
    /// Limited hinge
    Revolute,
    /// Two revolute axes in series
    Revolute2,
    /// Coupled rotation and translation
    Screw,
    /// Two perpendicular revolute axes
    Universal,
}

impl JointType {
    /// All valid joint types
    pub fn all() -> &'static [JointType] {
        &[
            JointType::Ball,
            JointType::Continuous,
            JointType::Fixed,
            JointType::Gearbox,
            JointType::Prismatic,
            JointType::Revolute,
            JointType::Revolute2,
            JointType::Screw,
            JointType::Universal,
        ]
    }

    /// Lowercase document name
    pub fn as_str(&self) -> &'static str {
        match self {
            JointType::Invalid => "invalid",
            JointType::Ball => "ball",
            JointType::Continuous => "continuous",
            JointType::Fixed => "fixed",
            JointType::Gearbox => "gearbox",
            JointType::Prismatic => "prismatic",
            JointType::Revolute => "revolute",
            JointType::Revolute2 => "revolute2",
            JointType::Screw => "screw",
            JointType::Universal => "universal",
        }
    }
}

impl fmt::Display for JointType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A joint type string that names no known type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown joint type '{0}'")]
pub struct UnknownJointType(pub String);

impl FromStr for JointType {
    type Err = UnknownJointType;

    /// Case-insensitive parse. `"invalid"` is not a valid input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == lower)
            .ok_or_else(|| UnknownJointType(s.to_string()))
    }
}

/// A joint loaded from a `<joint>` element
#[derive(Debug, Clone, Default)]
pub struct Joint {
    parent_link_name: String,
    child_link_name: String,
    joint_type: JointType,
    pose: Pose,
    pose_frame: String,
    axes: [Option<JointAxis>; 2],
    frame: FrameBinding,
    element: Option<ElementPtr>,
}

impl Joint {
    /// Create an unloaded joint with a private frame
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a `<joint>` element, resolving shared frame names to the
    /// first inserted vertex
    pub fn load(&mut self, element: ElementPtr, graph: Option<&SharedFrameGraph>) -> Diagnostics {
        self.load_with_tie_break(element, graph, TieBreak::FirstInserted)
    }

    /// Load from a `<joint>` element with an explicit policy for resolving
    /// the parent frame name
    pub fn load_with_tie_break(
        &mut self,
        element: ElementPtr,
        graph: Option<&SharedFrameGraph>,
        tie_break: TieBreak,
    ) -> Diagnostics {
        let mut errors = Diagnostics::new();
        *self = Self::default();
        self.element = Some(element.clone());

        // Nothing else in the element can be trusted if this fails
        if element.kind != "joint" {
            errors.push(Diagnostic::new(
                ErrorCode::ElementIncorrectType,
                "Attempting to load a Joint, but the provided element is not a <joint>.",
            ));
            return errors;
        }

        let name = load_name(&element).unwrap_or_else(|| {
            errors.push(Diagnostic::new(
                ErrorCode::AttributeMissing,
                "A joint name is required, but the name is not set.",
            ));
            String::new()
        });

        match element.get("parent", String::new()) {
            (parent, true) => self.parent_link_name = parent,
            (_, false) => errors.push(Diagnostic::new(
                ErrorCode::ElementMissing,
                "The parent element is missing.",
            )),
        }

        match element.get("child", String::new()) {
            (child, true) => self.child_link_name = child,
            (_, false) => errors.push(Diagnostic::new(
                ErrorCode::ElementMissing,
                "The child element is missing.",
            )),
        }

        if let Some((pose, frame)) = load_pose(&element) {
            self.pose = pose;
            self.pose_frame = frame;
        }
        if self.pose_frame.is_empty() {
            self.pose_frame = [&self.child_link_name, &self.parent_link_name, &name]
                .into_iter()
                .find(|candidate| !candidate.is_empty())
                .cloned()
                .unwrap_or_else(|| DEFAULT_ROOT_FRAME.to_string());
        }

        for (slot, kind) in self.axes.iter_mut().zip(["axis", "axis2"]) {
            if let Some(axis_element) = element.first_element(kind) {
                let mut axis = JointAxis::new();
                errors.extend(axis.load(axis_element.clone()));
                *slot = Some(axis);
            }
        }

        match element.get("type", String::new()) {
            (text, true) => match text.parse::<JointType>() {
                Ok(joint_type) => self.joint_type = joint_type,
                Err(UnknownJointType(text)) => {
                    self.joint_type = JointType::Invalid;
                    errors.push(Diagnostic::new(
                        ErrorCode::AttributeInvalid,
                        format!(
                            "Joint type of {text} is invalid. Valid joint types are: {}.",
                            JointType::all()
                                .iter()
                                .map(JointType::as_str)
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    ));
                }
            },
            (_, false) => {
                self.joint_type = JointType::Invalid;
                errors.push(Diagnostic::new(
                    ErrorCode::AttributeMissing,
                    "A joint type is required, but is not set.",
                ));
            }
        }

        match graph {
            Some(graph) => {
                self.frame = FrameBinding::attach(
                    graph,
                    &name,
                    &self.pose,
                    &self.parent_link_name,
                    tie_break,
                    "joint",
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

        tracing::debug!(
            "Loaded joint '{}' ({}) with {} diagnostic(s)",
            name,
            self.joint_type,
            errors.len()
        );
        errors
    }

    /// Joint name, read from its frame
    pub fn name(&self) -> String {
        self.frame.name()
    }

    /// Rename the joint's frame
    pub fn set_name(&mut self, name: &str) {
        if let Err(e) = self.frame.set_name(name) {
            tracing::error!("Failed to rename joint frame: {}", e);
        }
    }

    /// Joint type
    pub fn joint_type(&self) -> JointType {
        self.joint_type
    }

    /// Set the joint type
    pub fn set_joint_type(&mut self, joint_type: JointType) {
        self.joint_type = joint_type;
    }

    /// Name of the parent (reference) link
    pub fn parent_link_name(&self) -> &str {
        &self.parent_link_name
    }

    /// Set the parent link name.
    ///
    /// Only the recorded name changes. The joint stays connected to the
    /// frame it was wired to at load, so resolved poses are unaffected.
    pub fn set_parent_link_name(&mut self, name: impl Into<String>) {
        self.parent_link_name = name.into();
        tracing::debug!(
            "Joint '{}' parent renamed to '{}'; frame graph edges unchanged",
            self.name(),
            self.parent_link_name
        );
    }

    /// Name of the child (dependent) link
    pub fn child_link_name(&self) -> &str {
        &self.child_link_name
    }

    /// Set the child link name.
    ///
    /// Only the recorded name changes; see [`Joint::set_parent_link_name`].
    pub fn set_child_link_name(&mut self, name: impl Into<String>) {
        self.child_link_name = name.into();
        tracing::debug!(
            "Joint '{}' child renamed to '{}'; frame graph edges unchanged",
            self.name(),
            self.child_link_name
        );
    }

    /// Axis by index. Indices above 1 read the second axis.
    pub fn axis(&self, index: usize) -> Option<&JointAxis> {
        self.axes[index.min(1)].as_ref()
    }

    /// Local pose
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Set the local pose, keeping the frame graph in step
    pub fn set_pose(&mut self, pose: Pose) {
        if let Err(e) = self.frame.set_pose(&pose) {
            tracing::error!("Failed to update joint frame pose: {}", e);
        }
        self.pose = pose;
    }

    /// Frame the local pose is expressed in
    pub fn pose_frame(&self) -> &str {
        &self.pose_frame
    }

    /// Set the pose frame. Empty names are rejected.
    pub fn set_pose_frame(&mut self, frame: impl Into<String>) -> bool {
        let frame = frame.into();
        if frame.is_empty() {
            return false;
        }
        self.pose_frame = frame;
        true
    }

    /// Pose of the joint expressed in `frame` (empty means the pose frame)
    pub fn pose_in_frame(&self, frame: &str) -> Result<Pose, PoseError> {
        let frame = if frame.is_empty() {
            self.pose_frame.as_str()
        } else {
            frame
        };
        self.frame.pose_in_frame(frame)
    }

    /// The joint's frame binding
    pub fn frame(&self) -> &FrameBinding {
        &self.frame
    }

    /// The element this joint was loaded from
    pub fn element(&self) -> Option<&ElementPtr> {
        self.element.as_ref()
    }
}
