// core/scene.rs
//
// Scene graph: an explicit tree of visual nodes with parent-relative transforms.
//
// Usage:
//   let mut scene = SceneGraph::new();
//   let sun = scene.spawn("Sun", Visual::CameraAnchor);
//   scene.attach_child(scene.root(), sun)?;
//   let world = scene.world_position(sun);
//
// A child's local transform is always relative to its parent. Moving a parent
// moves the whole subtree; world transforms are composed lazily on read.

use glam::{DAffine3, DQuat, DVec3, EulerRot};

use crate::api::types::{NodeId, TextureHandle};
use crate::error::SceneError;

/// How a sphere or ring is shaded by the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shading {
    /// Self-lit (stars).
    Emissive,
    /// Lit by the scene lights.
    Lit,
}

/// Texture set bound to a surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surface {
    pub map: TextureHandle,
    pub bump: Option<TextureHandle>,
    pub specular: Option<TextureHandle>,
    /// Alpha mask (atmosphere shells).
    pub alpha: Option<TextureHandle>,
    pub shading: Shading,
}

/// Opaque description of what a node looks like.
/// The rendering collaborator owns meshes and materials; this is all it gets.
#[derive(Debug, Clone, PartialEq)]
pub enum Visual {
    SceneRoot,
    Sphere { radius: f64, surface: Surface },
    Ring { inner_radius: f64, outer_radius: f64, surface: Surface },
    /// Unit circle in the XZ plane; scaled to the orbit radius.
    OrbitPath,
    Label { text: String, icon: Option<String> },
    CameraAnchor,
}

impl Visual {
    /// Numeric kind used in the flat render buffer.
    pub fn kind_code(&self) -> u32 {
        match self {
            Visual::SceneRoot => 0,
            Visual::Sphere { .. } => 1,
            Visual::Ring { .. } => 2,
            Visual::OrbitPath => 3,
            Visual::Label { .. } => 4,
            Visual::CameraAnchor => 5,
        }
    }
}

/// Transform relative to the parent node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTransform {
    pub position: DVec3,
    /// Euler angles in radians, applied in XYZ order.
    pub rotation: DVec3,
    pub scale: DVec3,
}

impl Default for LocalTransform {
    fn default() -> Self {
        Self {
            position: DVec3::ZERO,
            rotation: DVec3::ZERO,
            scale: DVec3::ONE,
        }
    }
}

impl LocalTransform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, position: DVec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: DVec3) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: DVec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn to_affine(&self) -> DAffine3 {
        let rotation = DQuat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        DAffine3::from_scale_rotation_translation(self.scale, rotation, self.position)
    }
}

/// One node in the tree.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub visual: Visual,
    pub local: LocalTransform,
    /// Hidden nodes hide their whole subtree.
    pub visible: bool,
    pub opacity: f64,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl SceneNode {
    fn new(name: String, visual: Visual, local: LocalTransform) -> Self {
        Self {
            name,
            visual,
            local,
            visible: true,
            opacity: 1.0,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }
}

/// Arena-backed node tree. Node 0 is the scene root.
#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<SceneNode>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![SceneNode::new(
                "scene".to_string(),
                Visual::SceneRoot,
                LocalTransform::default(),
            )],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Create a detached node. It is not part of the scene until attached.
    pub fn spawn(&mut self, name: impl Into<String>, visual: Visual) -> NodeId {
        self.spawn_with(name, visual, LocalTransform::default())
    }

    /// Create a detached node with an initial local transform.
    pub fn spawn_with(
        &mut self,
        name: impl Into<String>,
        visual: Visual,
        local: LocalTransform,
    ) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(SceneNode::new(name.into(), visual, local));
        id
    }

    /// Make `child` a child of `parent`, detaching it from any previous parent.
    pub fn attach_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        self.check(parent)?;
        self.check(child)?;
        if parent == child || self.is_descendant_of(parent, child) {
            return Err(SceneError::Cycle { parent, child });
        }

        self.unlink(child);
        self.nodes[child.index()].parent = Some(parent);
        self.nodes[parent.index()].children.push(child);
        Ok(())
    }

    fn unlink(&mut self, child: NodeId) {
        if let Some(old_parent) = self.nodes[child.index()].parent.take() {
            self.nodes[old_parent.index()].children.retain(|&c| c != child);
        }
    }

    fn check(&self, id: NodeId) -> Result<(), SceneError> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(SceneError::UnknownNode(id))
        }
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneNode> {
        self.nodes.get(id.index())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(id.index())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(|n| n.children.as_slice()).unwrap_or(&[])
    }

    pub fn local(&self, id: NodeId) -> Option<&LocalTransform> {
        self.get(id).map(|n| &n.local)
    }

    pub fn local_mut(&mut self, id: NodeId) -> Option<&mut LocalTransform> {
        self.get_mut(id).map(|n| &mut n.local)
    }

    pub fn set_visible(&mut self, id: NodeId, visible: bool) {
        if let Some(node) = self.get_mut(id) {
            node.visible = visible;
        }
    }

    pub fn set_opacity(&mut self, id: NodeId, opacity: f64) {
        if let Some(node) = self.get_mut(id) {
            node.opacity = opacity;
        }
    }

    /// Whether `id` sits anywhere below `ancestor`.
    pub fn is_descendant_of(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.parent(id);
        while let Some(p) = current {
            if p == ancestor {
                return true;
            }
            current = self.parent(p);
        }
        false
    }

    /// Visible only if the node and every ancestor are visible.
    pub fn is_visible_in_tree(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(n) = current {
            match self.get(n) {
                Some(node) if node.visible => current = node.parent,
                _ => return false,
            }
        }
        true
    }

    /// Compose local transforms from the top of the node's chain down to it.
    pub fn world_transform(&self, id: NodeId) -> DAffine3 {
        let mut world = DAffine3::IDENTITY;
        let mut current = Some(id);
        while let Some(n) = current {
            let Some(node) = self.get(n) else { break };
            world = node.local.to_affine() * world;
            current = node.parent;
        }
        world
    }

    pub fn world_position(&self, id: NodeId) -> DVec3 {
        self.world_transform(id).translation
    }

    /// Iterate over every node with its id, in creation order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &SceneNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeId(i as u32), node))
    }

    /// Number of nodes, including the root.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}
