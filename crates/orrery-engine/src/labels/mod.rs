//! Point-of-interest labels attached to a body's surface.

pub mod visibility;

use glam::{DQuat, DVec3};

use crate::api::config::LabelThresholds;
use crate::api::types::NodeId;
use crate::bodies::descriptor::PointOfInterest;
use crate::core::scene::{LocalTransform, SceneGraph, Visual};
use crate::error::SceneError;

pub use visibility::{angle_between, distance_opacity, label_opacity, ramp, rotation_opacity};

/// One placed label. Its position never changes after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub node: NodeId,
    pub name: String,
    /// Position in the owning body's frame.
    pub position: DVec3,
    pub opacity: f64,
}

/// All labels of one body. Hidden until the body gains focus.
#[derive(Debug, Clone, Default)]
pub struct LabelSet {
    /// Distance from the body centre to each label (the body radius).
    radius: f64,
    labels: Vec<Label>,
    shown: bool,
}

/// Place a label on a sphere: start at (radius, 0, 0), turn `y` about Y, then `z` about Z.
pub fn label_position(radius: f64, y: f64, z: f64) -> DVec3 {
    let around_y = DQuat::from_rotation_y(y) * DVec3::new(radius, 0.0, 0.0);
    DQuat::from_rotation_z(z) * around_y
}

impl LabelSet {
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            labels: Vec::new(),
            shown: false,
        }
    }

    /// Create a label node under `parent` for the given point of interest.
    pub fn create_poi_label(
        &mut self,
        scene: &mut SceneGraph,
        parent: NodeId,
        poi: &PointOfInterest,
    ) -> Result<NodeId, SceneError> {
        let position = label_position(self.radius, poi.y, poi.z);
        let node = scene.spawn_with(
            poi.name.clone(),
            Visual::Label {
                text: poi.name.clone(),
                icon: poi.icon.clone(),
            },
            LocalTransform::new().with_position(position),
        );
        scene.attach_child(parent, node)?;
        scene.set_visible(node, self.shown);

        self.labels.push(Label {
            node,
            name: poi.name.clone(),
            position,
            opacity: 1.0,
        });
        Ok(node)
    }

    pub fn show(&mut self, scene: &mut SceneGraph) {
        self.set_shown(scene, true);
    }

    pub fn hide(&mut self, scene: &mut SceneGraph) {
        self.set_shown(scene, false);
    }

    fn set_shown(&mut self, scene: &mut SceneGraph, shown: bool) {
        self.shown = shown;
        for label in &self.labels {
            scene.set_visible(label.node, shown);
        }
    }

    /// Recompute every label's opacity for a camera position in the body's frame.
    pub fn update(&mut self, camera: DVec3, thresholds: &LabelThresholds, scene: &mut SceneGraph) {
        for label in &mut self.labels {
            label.opacity = label_opacity(camera, label.position, self.radius, thresholds);
            scene.set_opacity(label.node, label.opacity);
        }
    }

    pub fn is_shown(&self) -> bool {
        self.shown
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
