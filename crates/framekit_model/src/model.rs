// SPDX-License-Identifier: MIT OR Apache-2.0
//! Models: the document root that owns the frame graph.
//!
//! A model creates one shared graph with an implicit root frame, then loads
//! its links, joints and lights in that order so joints can reference any
//! link regardless of document order.

use crate::element::ElementPtr;
use crate::error::{Diagnostic, Diagnostics, ErrorCode, PoseError};
use crate::joint::Joint;
use crate::light::Light;
use crate::link::Link;
use crate::settings::LoaderSettings;
use crate::utils::load_name;
use framekit_graph::{pose_in_frame, FrameGraph, Pose, SharedFrameGraph};
use std::collections::HashSet;

/// A model loaded from a `<model>` element
#[derive(Debug, Clone)]
pub struct Model {
    name: String,
    links: Vec<Link>,
    joints: Vec<Joint>,
    lights: Vec<Light>,
    graph: SharedFrameGraph,
    element: Option<ElementPtr>,
}

impl Default for Model {
    fn default() -> Self {
        Self {
            name: String::new(),
            links: Vec::new(),
            joints: Vec::new(),
            lights: Vec::new(),
            graph: FrameGraph::new().into_shared(),
            element: None,
        }
    }
}

impl Model {
    /// Create an empty model
    pub fn new() -> Self {
        Self::default()
    }

    /// Load with default settings
    pub fn load(&mut self, element: ElementPtr) -> Diagnostics {
        self.load_with_settings(element, &LoaderSettings::default())
    }

    /// Load from a `<model>` element.
    ///
    /// Diagnostics from every child are collected in document order within
    /// each kind; a failing child never stops the others from loading.
    pub fn load_with_settings(
        &mut self,
        element: ElementPtr,
        settings: &LoaderSettings,
    ) -> Diagnostics {
        let mut errors = Diagnostics::new();
        *self = Self::default();
        self.element = Some(element.clone());

        if element.kind != "model" {
            errors.push(Diagnostic::new(
                ErrorCode::ElementIncorrectType,
                "Attempting to load a Model, but the provided element is not a <model>.",
            ));
            return errors;
        }

        self.name = load_name(&element).unwrap_or_else(|| {
            errors.push(Diagnostic::new(
                ErrorCode::AttributeMissing,
                "A model name is required, but the name is not set.",
            ));
            String::new()
        });

        self.graph = FrameGraph::with_root(settings.root_frame.clone()).into_shared();
        let tie_break = settings.tie_break();

        let mut link_names = HashSet::new();
        for link_element in element.elements("link") {
            if !claim_name(&mut link_names, link_element, "link", &mut errors) {
                continue;
            }
            let mut link = Link::new();
            errors.extend(link.load_with_tie_break(
                link_element.clone(),
                Some(&self.graph),
                tie_break,
            ));
            self.links.push(link);
        }

        let mut joint_names = HashSet::new();
        for joint_element in element.elements("joint") {
            if !claim_name(&mut joint_names, joint_element, "joint", &mut errors) {
                continue;
            }
            let mut joint = Joint::new();
            errors.extend(joint.load_with_tie_break(
                joint_element.clone(),
                Some(&self.graph),
                tie_break,
            ));
            self.joints.push(joint);
        }

        for light_element in element.elements("light") {
            let mut light = Light::new();
            errors.extend(light.load_with_tie_break(
                light_element.clone(),
                Some(&self.graph),
                tie_break,
            ));
            self.lights.push(light);
        }

        tracing::info!(
            "Loaded model '{}': {} link(s), {} joint(s), {} light(s), {} diagnostic(s)",
            self.name,
            self.links.len(),
            self.joints.len(),
            self.lights.len(),
            errors.len()
        );
        errors
    }

    /// Model name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of links
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Link by position in the document
    pub fn link_by_index(&self, index: usize) -> Option<&Link> {
        self.links.get(index)
    }

    /// Link by name
    pub fn link_by_name(&self, name: &str) -> Option<&Link> {
        self.links.iter().find(|l| l.name() == name)
    }

    /// Mutable link by name
    pub fn link_by_name_mut(&mut self, name: &str) -> Option<&mut Link> {
        self.links.iter_mut().find(|l| l.name() == name)
    }

    /// All links
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Number of joints
    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    /// Joint by position in the document
    pub fn joint_by_index(&self, index: usize) -> Option<&Joint> {
        self.joints.get(index)
    }

    /// Joint by name
    pub fn joint_by_name(&self, name: &str) -> Option<&Joint> {
        self.joints.iter().find(|j| j.name() == name)
    }

    /// Mutable joint by name
    pub fn joint_by_name_mut(&mut self, name: &str) -> Option<&mut Joint> {
        self.joints.iter_mut().find(|j| j.name() == name)
    }

    /// All joints
    pub fn joints(&self) -> &[Joint] {
        &self.joints
    }

    /// Number of lights
    pub fn light_count(&self) -> usize {
        self.lights.len()
    }

    /// Light by position in the document
    pub fn light_by_index(&self, index: usize) -> Option<&Light> {
        self.lights.get(index)
    }

    /// All lights
    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    /// The model's frame graph
    pub fn frame_graph(&self) -> &SharedFrameGraph {
        &self.graph
    }

    /// Name of the model's root frame
    pub fn root_frame(&self) -> String {
        self.graph
            .read()
            .root_name()
            .map(str::to_string)
            .unwrap_or_default()
    }

    /// Pose of frame `source` expressed in frame `target`
    pub fn pose_in_frame(&self, source: &str, target: &str) -> Result<Pose, PoseError> {
        Ok(pose_in_frame(source, target, &self.graph.read())?)
    }

    /// The element this model was loaded from
    pub fn element(&self) -> Option<&ElementPtr> {
        self.element.as_ref()
    }
}

/// Record a child's name, reporting a clash with an earlier sibling.
///
/// Unnamed children are let through so their own loader reports them.
fn claim_name(
    names: &mut HashSet<String>,
    element: &ElementPtr,
    kind: &str,
    errors: &mut Diagnostics,
) -> bool {
    let Some(name) = load_name(element) else {
        return true;
    };
    if names.insert(name.clone()) {
        return true;
    }
    errors.push(Diagnostic::new(
        ErrorCode::DuplicateName,
        format!("A {kind} with name [{name}] already exists."),
    ));
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Element, Value};
    use framekit_graph::ResolveError;

    const EPSILON: f64 = 1e-9;

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    fn link(name: &str, pose: [f64; 6], relative_to: Option<&str>) -> Element {
        let mut pose_element = Element::new("pose").with_value(Value::Pose(pose));
        if let Some(frame) = relative_to {
            pose_element = pose_element.with_attribute("relative_to", string(frame));
        }
        Element::new("link")
            .with_attribute("name", string(name))
            .with_child(pose_element)
    }

    fn joint(name: &str, parent: &str, child: &str, pose: [f64; 6]) -> Element {
        Element::new("joint")
            .with_attribute("name", string(name))
            .with_attribute("type", string("revolute"))
            .with_child(Element::new("parent").with_value(string(parent)))
            .with_child(Element::new("child").with_value(string(child)))
            .with_child(Element::new("pose").with_value(Value::Pose(pose)))
    }

    /// base at z=1, arm 2 units along x from base, elbow joint 0.5 above base
    fn arm_model() -> Element {
        Element::new("model")
            .with_attribute("name", string("arm"))
            // Joints are listed first; links must still load before them
            .with_child(joint("elbow", "base", "arm", [0.0, 0.0, 0.5, 0.0, 0.0, 0.0]))
            .with_child(link("base", [0.0, 0.0, 1.0, 0.0, 0.0, 0.0], None))
            .with_child(link("arm", [2.0, 0.0, 0.0, 0.0, 0.0, 0.0], Some("base")))
            .with_child(
                Element::new("light")
                    .with_attribute("name", string("lamp"))
                    .with_child(
                        Element::new("pose")
                            .with_attribute("relative_to", string("arm"))
                            .with_value(Value::Pose([0.0, 0.0, 0.1, 0.0, 0.0, 0.0])),
                    ),
            )
    }

    #[test]
    fn test_load_model() {
        let mut model = Model::new();
        let errors = model.load(arm_model().into_ptr());

        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(model.name(), "arm");
        assert_eq!(model.root_frame(), "__model__");
        assert_eq!(model.link_count(), 2);
        assert_eq!(model.joint_count(), 1);
        assert_eq!(model.light_count(), 1);
        assert_eq!(model.link_by_index(1).unwrap().name(), "arm");
        assert!(model.link_by_name("base").is_some());
        assert!(model.joint_by_name("elbow").is_some());
        assert!(model.joint_by_index(3).is_none());
        // root + 2 links + joint + light
        assert_eq!(model.frame_graph().read().vertex_count(), 5);
    }

    #[test]
    fn test_chain_composition() {
        let mut model = Model::new();
        model.load(arm_model().into_ptr());

        let lamp = model.pose_in_frame("lamp", "__model__").unwrap();
        assert!(lamp.approx_eq(&Pose::from_translation([2.0, 0.0, 1.1]), EPSILON));

        let elbow = model.pose_in_frame("elbow", "arm").unwrap();
        assert!(elbow.approx_eq(&Pose::from_translation([-2.0, 0.0, 0.5]), EPSILON));

        let inverse = model.pose_in_frame("__model__", "lamp").unwrap();
        assert!(inverse.approx_eq(&lamp.inverse(), EPSILON));
    }

    #[test]
    fn test_entity_queries_share_the_model_graph() {
        let mut model = Model::new();
        model.load(arm_model().into_ptr());

        let joint = model.joint_by_name("elbow").unwrap();
        assert!(joint
            .pose_in_frame("base")
            .unwrap()
            .approx_eq(&Pose::from_translation([0.0, 0.0, 0.5]), EPSILON));

        let light = model.light_by_index(0).unwrap();
        assert!(light
            .pose_in_frame("")
            .unwrap()
            .approx_eq(&Pose::from_translation([0.0, 0.0, 0.1]), EPSILON));
    }

    #[test]
    fn test_duplicate_names() {
        let element = Element::new("model")
            .with_attribute("name", string("dup"))
            .with_child(link("base", [0.0; 6], None))
            .with_child(link("base", [1.0, 0.0, 0.0, 0.0, 0.0, 0.0], None))
            .with_child(joint("j", "base", "base", [0.0; 6]))
            .with_child(joint("j", "base", "base", [0.0; 6]));

        let mut model = Model::new();
        let errors = model.load(element.into_ptr());

        let codes: Vec<ErrorCode> = errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::DuplicateName, ErrorCode::DuplicateName]);
        assert_eq!(model.link_count(), 1);
        assert_eq!(model.joint_count(), 1);
    }

    #[test]
    fn test_failing_child_does_not_abort_siblings() {
        let element = Element::new("model")
            .with_attribute("name", string("partial"))
            .with_child(link("base", [0.0; 6], None))
            .with_child(joint("loose", "missing", "base", [0.0; 6]))
            .with_child(link("tip", [0.0, 0.0, 1.0, 0.0, 0.0, 0.0], Some("base")));

        let mut model = Model::new();
        let errors = model.load(element.into_ptr());

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::FrameGraphError);
        assert_eq!(model.link_count(), 2);
        assert_eq!(model.joint_count(), 1);
        assert!(matches!(
            model.pose_in_frame("loose", "base"),
            Err(PoseError::Resolve(ResolveError::NoPath { .. }))
        ));
    }

    #[test]
    fn test_custom_root_frame() {
        let settings = LoaderSettings {
            root_frame: "__base__".to_string(),
            ..Default::default()
        };
        let mut model = Model::new();
        let errors = model.load_with_settings(arm_model().into_ptr(), &settings);

        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(model.root_frame(), "__base__");
        assert_eq!(model.link_by_name("base").unwrap().pose_frame(), "__base__");
        assert!(model.pose_in_frame("base", "__base__").is_ok());
    }

    #[test]
    fn test_wrong_kind() {
        let mut model = Model::new();
        let errors = model.load(Element::new("world").into_ptr());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].code, ErrorCode::ElementIncorrectType);
        assert_eq!(model.link_count(), 0);
    }

    #[test]
    fn test_demo_document() {
        let element = Element::from_ron(include_str!("../../../demos/arm.ron")).unwrap();
        let mut model = Model::new();
        let errors = model.load(element.into_ptr());

        assert!(errors.is_empty(), "{errors:?}");
        assert_eq!(model.link_count(), 3);
        assert_eq!(model.joint_count(), 2);

        let lamp = model.light_by_index(0).unwrap();
        assert_eq!(lamp.light_type(), crate::light::LightType::Spot);
        assert_eq!(lamp.attenuation_range(), 5.0);
        assert!(lamp.cast_shadows());

        // forearm is pitched a quarter turn, so the lamp's offset points along +x
        let in_root = model.pose_in_frame("lamp", "__model__").unwrap();
        let [x, y, z] = in_root.position;
        assert!((x - 0.45).abs() < EPSILON, "{x}");
        assert!(y.abs() < EPSILON);
        assert!((z - 0.6).abs() < EPSILON, "{z}");
    }

    #[test]
    fn test_unknown_frame() {
        let mut model = Model::new();
        model.load(arm_model().into_ptr());
        assert_eq!(
            model.pose_in_frame("nowhere", "base"),
            Err(PoseError::Resolve(ResolveError::NotFound("nowhere".to_string())))
        );
        assert_eq!(
            model.pose_in_frame("ghost", "ghost"),
            Err(PoseError::Resolve(ResolveError::NotFound("ghost".to_string())))
        );
    }
}
