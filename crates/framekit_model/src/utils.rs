// SPDX-License-Identifier: MIT OR Apache-2.0
//! Helpers shared by the entity loaders.

use crate::element::{Element, FromValue};
use framekit_graph::Pose;

/// Read the `name` attribute
pub fn load_name(element: &Element) -> Option<String> {
    match element.get("name", String::new()) {
        (name, true) => Some(name),
        (_, false) => None,
    }
}

/// Read the optional `<pose>` child.
///
/// Returns the pose and the frame it is expressed in (`relative_to`, or the
/// older `frame` attribute; empty when neither is set), or `None` if the
/// element has no pose.
pub fn load_pose(element: &Element) -> Option<(Pose, String)> {
    let pose_element = element.first_element("pose")?;

    let pose = pose_element
        .value
        .as_ref()
        .and_then(Pose::from_value)
        .unwrap_or(Pose::IDENTITY);

    let (relative_to, has_relative_to) = pose_element.get("relative_to", String::new());
    let frame = if has_relative_to {
        relative_to
    } else {
        pose_element.get("frame", String::new()).0
    };

    Some((pose, frame))
}

/// Names of the form `__name__` are reserved for implicit frames
pub fn is_reserved_name(name: &str) -> bool {
    name.len() >= 4 && name.starts_with("__") && name.ends_with("__")
}
