//! Motion system: advances every body's orbit and spin.

use crate::core::registry::BodyRegistry;
use crate::core::scene::SceneGraph;

/// Tick every body at `elapsed` simulated seconds.
///
/// Order does not matter: each body writes only its own parent-relative
/// transform, and world positions are composed by the scene graph on read.
pub fn tick_bodies(registry: &BodyRegistry, scene: &mut SceneGraph, elapsed: f64) {
    for body in registry.iter() {
        body.tick(elapsed, scene);
    }
}
