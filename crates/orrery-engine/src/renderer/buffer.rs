use bytemuck::{Pod, Zeroable};
use glam::DMat4;

use crate::core::scene::SceneGraph;

/// Per-node render data read by the host renderer straight out of wasm memory.
/// Must match the host protocol: 20 floats = 80 bytes stride.
///
/// Entry `i` describes scene node `i`, so node ids index the buffer directly.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct NodeTransform {
    /// Column-major world matrix.
    pub world: [f32; 16],
    /// Label fade (1.0 for every other node).
    pub opacity: f32,
    /// 1.0 when the node and all its ancestors are visible.
    pub visible: f32,
    /// `Visual::kind_code` of the node.
    pub kind: f32,
    pub _pad: f32,
}

impl NodeTransform {
    pub const FLOATS: usize = 20;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;
}

/// Flat per-frame export of the scene graph.
pub struct TransformBuffer {
    entries: Vec<NodeTransform>,
}

impl TransformBuffer {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(128),
        }
    }

    /// Recompose every node's world transform.
    pub fn rebuild(&mut self, scene: &SceneGraph) {
        self.entries.clear();
        for (id, node) in scene.iter() {
            let world = DMat4::from(scene.world_transform(id)).as_mat4();
            self.entries.push(NodeTransform {
                world: world.to_cols_array(),
                opacity: node.opacity as f32,
                visible: if scene.is_visible_in_tree(id) { 1.0 } else { 0.0 },
                kind: node.visual.kind_code() as f32,
                _pad: 0.0,
            });
        }
    }

    pub fn entries(&self) -> &[NodeTransform] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw pointer to entry data for host-side reads.
    pub fn ptr(&self) -> *const f32 {
        self.entries.as_ptr() as *const f32
    }
}

impl Default for TransformBuffer {
    fn default() -> Self {
        Self::new()
    }
}
