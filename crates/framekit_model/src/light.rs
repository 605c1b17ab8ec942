// SPDX-License-Identifier: MIT OR Apache-2.0
//! Light sources.
//!
//! Lights are positioned like links: their pose is expressed in a frame
//! that defaults to the model's root frame. Loading a light without a frame
//! graph is allowed; such a light simply cannot answer pose queries.

use crate::element::ElementPtr;
use crate::error::{Diagnostic, Diagnostics, ErrorCode, PoseError};
use crate::frame::FrameBinding;
use crate::settings::DEFAULT_ROOT_FRAME;
use crate::utils::{is_reserved_name, load_name, load_pose};
use framekit_graph::{Pose, SharedFrameGraph, TieBreak};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Kind of light source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LightType {
    /// Unrecognized type
    Invalid,
    /// Omnidirectional point source
    #[default]
    Point,
    /// Cone-shaped source
    Spot,
    /// Parallel rays from infinitely far away
    Directional,
}

impl LightType {
    /// Document name
    pub fn as_str(&self) -> &'static str {
        match self {
            LightType::Invalid => "invalid",
            LightType::Point => "point",
            LightType::Spot => "spot",
            LightType::Directional => "directional",
        }
    }
}

/// A light type string that names no known type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown light type '{0}'")]
pub struct UnknownLightType(pub String);

impl FromStr for LightType {
    type Err = UnknownLightType;

    /// Case-sensitive parse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "point" => Ok(LightType::Point),
            "spot" => Ok(LightType::Spot),
            "directional" => Ok(LightType::Directional),
            other => Err(UnknownLightType(other.to_string())),
        }
    }
}

/// A light loaded from a `<light>` element
#[derive(Debug, Clone)]
pub struct Light {
    light_type: LightType,
    pose: Pose,
    pose_frame: String,
    cast_shadows: bool,
    diffuse: [f32; 4],
    specular: [f32; 4],
    attenuation_range: f64,
    linear_attenuation: f64,
    constant_attenuation: f64,
    quadratic_attenuation: f64,
    direction: [f64; 3],
    spot_inner_angle: f64,
    spot_outer_angle: f64,
    spot_falloff: f64,
    frame: FrameBinding,
    element: Option<ElementPtr>,
}

impl Default for Light {
    fn default() -> Self {
        Self {
            light_type: LightType::Point,
            pose: Pose::IDENTITY,
            pose_frame: String::new(),
            cast_shadows: false,
            diffuse: [0.0, 0.0, 0.0, 1.0],
            specular: [0.0, 0.0, 0.0, 1.0],
            attenuation_range: 10.0,
            linear_attenuation: 1.0,
            constant_attenuation: 1.0,
            quadratic_attenuation: 0.0,
            direction: [0.0, 0.0, -1.0],
            spot_inner_angle: 0.0,
            spot_outer_angle: 0.0,
            spot_falloff: 0.0,
            frame: FrameBinding::default(),
            element: None,
        }
    }
}

impl Light {
    /// Create an unloaded point light
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from a `<light>` element
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

        if element.kind != "light" {
            errors.push(Diagnostic::new(
                ErrorCode::ElementIncorrectType,
                "Attempting to load a Light, but the provided element is not a <light>.",
            ));
            return errors;
        }

        let type_text = element.get("type", "point".to_string()).0;
        self.light_type = type_text.parse().unwrap_or_else(|UnknownLightType(text)| {
            errors.push(Diagnostic::new(
                ErrorCode::AttributeInvalid,
                format!("Invalid light type with a value of [{text}]."),
            ));
            LightType::Invalid
        });

        let name = load_name(&element).unwrap_or_else(|| {
            errors.push(Diagnostic::new(
                ErrorCode::AttributeMissing,
                "A light name is required, but the name is not set.",
            ));
            String::new()
        });

        if is_reserved_name(&name) {
            errors.push(Diagnostic::new(
                ErrorCode::ReservedName,
                format!("The supplied light name [{name}] is reserved."),
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

        self.cast_shadows = element.get("cast_shadows", self.cast_shadows).0;
        self.diffuse = element.get("diffuse", self.diffuse).0;
        self.specular = element.get("specular", self.specular).0;

        if let Some(attenuation) = element.first_element("attenuation") {
            let (range, has_range) = attenuation.get("range", self.attenuation_range);
            if !has_range {
                errors.push(Diagnostic::new(
                    ErrorCode::ElementMissing,
                    "An <attenuation> requires a <range>.",
                ));
            }
            self.set_attenuation_range(range);
            self.set_linear_attenuation_factor(
                attenuation.get("linear", self.linear_attenuation).0,
            );
            self.set_constant_attenuation_factor(
                attenuation.get("constant", self.constant_attenuation).0,
            );
            self.set_quadratic_attenuation_factor(
                attenuation.get("quadratic", self.quadratic_attenuation).0,
            );
        }

        if matches!(self.light_type, LightType::Spot | LightType::Directional) {
            let (direction, has_direction) = element.get("direction", self.direction);
            if !has_direction {
                errors.push(Diagnostic::new(
                    ErrorCode::ElementMissing,
                    format!("A <direction> is required for a {type_text} light."),
                ));
            }
            self.direction = direction;
        }

        if self.light_type == LightType::Spot {
            if let Some(spot) = element.first_element("spot") {
                let mut required = |key: &str, label: &str, current: f64| {
                    let (value, present) = spot.get(key, current);
                    if !present {
                        errors.push(Diagnostic::new(
                            ErrorCode::ElementMissing,
                            format!("A spot light requires {label}."),
                        ));
                    }
                    value
                };
                let inner = required("inner_angle", "an <inner_angle>", self.spot_inner_angle);
                let outer = required("outer_angle", "an <outer_angle>", self.spot_outer_angle);
                let falloff = required("falloff", "a <falloff>", self.spot_falloff);
                self.set_spot_inner_angle(inner);
                self.set_spot_outer_angle(outer);
                self.set_spot_falloff(falloff);
            }
        }

        // Lights are usable standalone, so a missing graph is not reported
        self.frame = match graph {
            Some(graph) => FrameBinding::attach(
                graph,
                &name,
                &self.pose,
                &self.pose_frame,
                tie_break,
                "light",
                &mut errors,
            ),
            None => FrameBinding::detached(&name, &self.pose),
        };

        errors
    }

    /// Light name, read from its frame
    pub fn name(&self) -> String {
        self.frame.name()
    }

    /// Rename the light's frame
    pub fn set_name(&mut self, name: &str) {
        if let Err(e) = self.frame.set_name(name) {
            tracing::error!("Failed to rename light frame: {}", e);
        }
    }

    /// Light type
    pub fn light_type(&self) -> LightType {
        self.light_type
    }

    /// Set the light type
    pub fn set_light_type(&mut self, light_type: LightType) {
        self.light_type = light_type;
    }

    /// Local pose
    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    /// Set the local pose, keeping the frame graph in step
    pub fn set_pose(&mut self, pose: Pose) {
        if let Err(e) = self.frame.set_pose(&pose) {
            tracing::error!("Failed to update light frame pose: {}", e);
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

    /// Pose of the light expressed in `frame` (empty means the pose frame)
    pub fn pose_in_frame(&self, frame: &str) -> Result<Pose, PoseError> {
        let frame = if frame.is_empty() {
            self.pose_frame.as_str()
        } else {
            frame
        };
        self.frame.pose_in_frame(frame)
    }

    /// Whether the light casts shadows
    pub fn cast_shadows(&self) -> bool {
        self.cast_shadows
    }

    /// Set whether the light casts shadows
    pub fn set_cast_shadows(&mut self, cast: bool) {
        self.cast_shadows = cast;
    }

    /// Diffuse color (RGBA)
    pub fn diffuse(&self) -> [f32; 4] {
        self.diffuse
    }

    /// Set the diffuse color
    pub fn set_diffuse(&mut self, color: [f32; 4]) {
        self.diffuse = color;
    }

    /// Specular color (RGBA)
    pub fn specular(&self) -> [f32; 4] {
        self.specular
    }

    /// Set the specular color
    pub fn set_specular(&mut self, color: [f32; 4]) {
        self.specular = color;
    }

    /// Attenuation range
    pub fn attenuation_range(&self) -> f64 {
        self.attenuation_range
    }

    /// Set the attenuation range (clamped to be non-negative)
    pub fn set_attenuation_range(&mut self, range: f64) {
        self.attenuation_range = range.max(0.0);
    }

    /// Linear attenuation factor
    pub fn linear_attenuation_factor(&self) -> f64 {
        self.linear_attenuation
    }

    /// Set the linear attenuation factor (clamped to [0, 1])
    pub fn set_linear_attenuation_factor(&mut self, factor: f64) {
        self.linear_attenuation = factor.clamp(0.0, 1.0);
    }

    /// Constant attenuation factor
    pub fn constant_attenuation_factor(&self) -> f64 {
        self.constant_attenuation
    }

    /// Set the constant attenuation factor (clamped to [0, 1])
    pub fn set_constant_attenuation_factor(&mut self, factor: f64) {
        self.constant_attenuation = factor.clamp(0.0, 1.0);
    }

    /// Quadratic attenuation factor
    pub fn quadratic_attenuation_factor(&self) -> f64 {
        self.quadratic_attenuation
    }

    /// Set the quadratic attenuation factor (clamped to be non-negative)
    pub fn set_quadratic_attenuation_factor(&mut self, factor: f64) {
        self.quadratic_attenuation = factor.max(0.0);
    }

    /// Light direction
    pub fn direction(&self) -> [f64; 3] {
        self.direction
    }

    /// Set the light direction
    pub fn set_direction(&mut self, direction: [f64; 3]) {
        self.direction = direction;
    }

    /// Spot inner cone angle in radians
    pub fn spot_inner_angle(&self) -> f64 {
        self.spot_inner_angle
    }

    /// Set the spot inner angle (clamped to be non-negative)
    pub fn set_spot_inner_angle(&mut self, radians: f64) {
        self.spot_inner_angle = radians.max(0.0);
    }

    /// Spot outer cone angle in radians
    pub fn spot_outer_angle(&self) -> f64 {
        self.spot_outer_angle
    }

    /// Set the spot outer angle (clamped to be non-negative)
    pub fn set_spot_outer_angle(&mut self, radians: f64) {
        self.spot_outer_angle = radians.max(0.0);
    }

    /// Spot falloff
    pub fn spot_falloff(&self) -> f64 {
        self.spot_falloff
    }

    /// Set the spot falloff (clamped to be non-negative)
    pub fn set_spot_falloff(&mut self, falloff: f64) {
        self.spot_falloff = falloff.max(0.0);
    }

    /// The element this light was loaded from
    pub fn element(&self) -> Option<&ElementPtr> {
        self.element.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, Value};
    use framekit_graph::FrameGraph;

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn test_point_light_defaults() {
        let element = Element::new("light").with_attribute("name", string("lamp"));
        let mut light = Light::new();
        let errors = light.load(element.into_ptr(), None);

        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(light.name(), "lamp");
        assert_eq!(light.light_type(), LightType::Point);
        assert_eq!(light.attenuation_range(), 10.0);
        assert_eq!(light.direction(), [0.0, 0.0, -1.0]);
        assert_eq!(light.pose_frame(), "__model__");
        assert!(matches!(
            light.pose_in_frame(""),
            Err(PoseError::NoFrameGraph(_))
        ));
    }

    #[test]
    fn test_light_type_parse() {
        assert_eq!("spot".parse::<LightType>(), Ok(LightType::Spot));
        assert_eq!(
            "Spot".parse::<LightType>(),
            Err(UnknownLightType("Spot".to_string()))
        );
        assert!("invalid".parse::<LightType>().is_err());
    }

    #[test]
    fn test_reload_starts_from_defaults() {
        let first = Element::new("light")
            .with_attribute("name", string("spot"))
            .with_attribute("type", string("spot"))
            .with_attribute("direction", Value::Vector3([1.0, 0.0, 0.0]))
            .with_child(
                Element::new("pose")
                    .with_attribute("relative_to", string("elsewhere"))
                    .with_value(Value::Pose([1.0, 0.0, 0.0, 0.0, 0.0, 0.0])),
            )
            .with_child(Element::new("attenuation").with_attribute("range", Value::Double(2.0)));
        let second = Element::new("light").with_attribute("name", string("bulb"));

        let mut light = Light::new();
        light.load(first.into_ptr(), None);
        let errors = light.load(second.into_ptr(), None);

        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(light.name(), "bulb");
        assert_eq!(light.light_type(), LightType::Point);
        assert_eq!(light.pose_frame(), "__model__");
        assert!(light.pose().is_identity(1e-12));
        assert_eq!(light.attenuation_range(), 10.0);
        assert_eq!(light.direction(), [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_set_pose_frame_rejects_empty() {
        let mut light = Light::new();
        assert!(!light.set_pose_frame(""));
        assert!(light.set_pose_frame("arm"));
        assert_eq!(light.pose_frame(), "arm");
    }

    #[test]
    fn test_invalid_type() {
        let element = Element::new("light")
            .with_attribute("name", string("lamp"))
            .with_attribute("type", string("Spot"));
        let mut light = Light::new();
        let errors = light.load(element.into_ptr(), None);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::AttributeInvalid);
        assert!(errors[0].message.contains("[Spot]"));
        assert_eq!(light.light_type(), LightType::Invalid);
    }

    #[test]
    fn test_spot_light_requirements() {
        let element = Element::new("light")
            .with_attribute("name", string("spot"))
            .with_attribute("type", string("spot"))
            .with_child(
                Element::new("spot")
                    .with_attribute("inner_angle", Value::Double(0.3))
                    .with_attribute("outer_angle", Value::Double(-1.0)),
            );
        let mut light = Light::new();
        let errors = light.load(element.into_ptr(), None);

        let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "A <direction> is required for a spot light.",
                "A spot light requires a <falloff>.",
            ]
        );
        assert_eq!(light.spot_inner_angle(), 0.3);
        assert_eq!(light.spot_outer_angle(), 0.0);
    }

    #[test]
    fn test_attenuation_is_clamped() {
        let element = Element::new("light")
            .with_attribute("name", string("lamp"))
            .with_child(
                Element::new("attenuation")
                    .with_attribute("linear", Value::Double(4.0))
                    .with_attribute("quadratic", Value::Double(-2.0)),
            );
        let mut light = Light::new();
        let errors = light.load(element.into_ptr(), None);

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::ElementMissing);
        assert_eq!(light.linear_attenuation_factor(), 1.0);
        assert_eq!(light.quadratic_attenuation_factor(), 0.0);
        assert_eq!(light.attenuation_range(), 10.0);
    }

    #[test]
    fn test_light_in_graph() {
        let graph = FrameGraph::with_root("__model__").into_shared();
        let element = Element::new("light")
            .with_attribute("name", string("sun"))
            .with_attribute("type", string("directional"))
            .with_attribute("direction", Value::Vector3([0.0, 0.0, -1.0]))
            .with_child(Element::new("pose").with_value(Value::Pose([0.0, 0.0, 10.0, 0.0, 0.0, 0.0])));

        let mut light = Light::new();
        let errors = light.load(element.into_ptr(), Some(&graph));

        assert!(errors.is_empty(), "{errors:?}");
        let pose = light.pose_in_frame("__model__").unwrap();
        assert!(pose.approx_eq(&Pose::from_translation([0.0, 0.0, 10.0]), 1e-9));
    }
}
