// SPDX-License-Identifier: MIT OR Apache-2.0
//! Joint axis description (`<axis>` / `<axis2>`).

use crate::element::ElementPtr;
use crate::error::{Diagnostic, Diagnostics, ErrorCode};

/// Axis kinds accepted by [`JointAxis::load`]
const AXIS_KINDS: [&str; 2] = ["axis", "axis2"];

/// Default lower limit (effectively unbounded)
pub const DEFAULT_LOWER_LIMIT: f64 = -1e16;
/// Default upper limit (effectively unbounded)
pub const DEFAULT_UPPER_LIMIT: f64 = 1e16;

/// Rotation or translation axis of a joint with its limits and dynamics
#[derive(Debug, Clone)]
pub struct JointAxis {
    xyz: [f64; 3],
    use_parent_model_frame: bool,
    lower: f64,
    upper: f64,
    effort: f64,
    max_velocity: f64,
    damping: f64,
    friction: f64,
    spring_reference: f64,
    spring_stiffness: f64,
    element: Option<ElementPtr>,
}

impl Default for JointAxis {
    fn default() -> Self {
        Self {
            xyz: [0.0, 0.0, 1.0],
            use_parent_model_frame: false,
            lower: DEFAULT_LOWER_LIMIT,
            upper: DEFAULT_UPPER_LIMIT,
            effort: -1.0,
            max_velocity: -1.0,
            damping: 0.0,
            friction: 0.0,
            spring_reference: 0.0,
            spring_stiffness: 0.0,
            element: None,
        }
    }
}

impl JointAxis {
    /// Create an axis along +Z with no limits
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from an `<axis>` or `<axis2>` element
    pub fn load(&mut self, element: ElementPtr) -> Diagnostics {
        let mut errors = Diagnostics::new();
        self.element = Some(element.clone());

        if !AXIS_KINDS.contains(&element.kind.as_str()) {
            errors.push(Diagnostic::new(
                ErrorCode::ElementIncorrectType,
                "Attempting to load a JointAxis, but the provided element is not an \
                 <axis> or <axis2>.",
            ));
            return errors;
        }

        match element.get("xyz", self.xyz) {
            (xyz, true) => {
                if !self.set_xyz(xyz) {
                    errors.push(Diagnostic::new(
                        ErrorCode::AttributeInvalid,
                        format!("The xyz value {xyz:?} of a joint axis has zero length."),
                    ));
                }
            }
            (_, false) => errors.push(Diagnostic::new(
                ErrorCode::ElementMissing,
                "The xyz element in joint axis is required",
            )),
        }

        self.use_parent_model_frame = element.get("use_parent_model_frame", false).0;

        if let Some(limit) = element.first_element("limit") {
            self.lower = limit.get("lower", DEFAULT_LOWER_LIMIT).0;
            self.upper = limit.get("upper", DEFAULT_UPPER_LIMIT).0;
            self.effort = limit.get("effort", -1.0).0;
            self.max_velocity = limit.get("velocity", -1.0).0;
        }

        if let Some(dynamics) = element.first_element("dynamics") {
            self.damping = dynamics.get("damping", 0.0).0;
            self.friction = dynamics.get("friction", 0.0).0;
            self.spring_reference = dynamics.get("spring_reference", 0.0).0;
            self.spring_stiffness = dynamics.get("spring_stiffness", 0.0).0;
        }

        errors
    }

    /// Unit axis direction
    pub fn xyz(&self) -> [f64; 3] {
        self.xyz
    }

    /// Set the axis direction. The vector is normalized; a zero-length
    /// vector is rejected and leaves the axis unchanged.
    pub fn set_xyz(&mut self, xyz: [f64; 3]) -> bool {
        let norm = (xyz[0] * xyz[0] + xyz[1] * xyz[1] + xyz[2] * xyz[2]).sqrt();
        if !norm.is_finite() || norm < 1e-12 {
            return false;
        }
        self.xyz = [xyz[0] / norm, xyz[1] / norm, xyz[2] / norm];
        true
    }

    /// Whether `xyz` is expressed in the parent model frame
    pub fn use_parent_model_frame(&self) -> bool {
        self.use_parent_model_frame
    }

    /// Set whether `xyz` is expressed in the parent model frame
    pub fn set_use_parent_model_frame(&mut self, value: bool) {
        self.use_parent_model_frame = value;
    }

    /// Lower position limit
    pub fn lower(&self) -> f64 {
        self.lower
    }

    /// Set the lower position limit
    pub fn set_lower(&mut self, lower: f64) {
        self.lower = lower;
    }

    /// Upper position limit
    pub fn upper(&self) -> f64 {
        self.upper
    }

    /// Set the upper position limit
    pub fn set_upper(&mut self, upper: f64) {
        self.upper = upper;
    }

    /// Effort limit (negative means unlimited)
    pub fn effort(&self) -> f64 {
        self.effort
    }

    /// Set the effort limit
    pub fn set_effort(&mut self, effort: f64) {
        self.effort = effort;
    }

    /// Velocity limit (negative means unlimited)
    pub fn max_velocity(&self) -> f64 {
        self.max_velocity
    }

    /// Set the velocity limit
    pub fn set_max_velocity(&mut self, velocity: f64) {
        self.max_velocity = velocity;
    }

    /// Viscous damping coefficient
    pub fn damping(&self) -> f64 {
        self.damping
    }

    /// Set the damping coefficient
    pub fn set_damping(&mut self, damping: f64) {
        self.damping = damping;
    }

    /// Static friction
    pub fn friction(&self) -> f64 {
        self.friction
    }

    /// Set the static friction
    pub fn set_friction(&mut self, friction: f64) {
        self.friction = friction;
    }

    /// Spring reference position
    pub fn spring_reference(&self) -> f64 {
        self.spring_reference
    }

    /// Set the spring reference position
    pub fn set_spring_reference(&mut self, reference: f64) {
        self.spring_reference = reference;
    }

    /// Spring stiffness
    pub fn spring_stiffness(&self) -> f64 {
        self.spring_stiffness
    }

    /// Set the spring stiffness
    pub fn set_spring_stiffness(&mut self, stiffness: f64) {
        self.spring_stiffness = stiffness;
    }

    /// The element this axis was loaded from
    pub fn element(&self) -> Option<&ElementPtr> {
        self.element.as_ref()
    }
}
