//! Label system: refreshes the focused body's label opacities.

use glam::DVec3;

use crate::api::config::LabelThresholds;
use crate::core::registry::BodyRegistry;
use crate::core::scene::SceneGraph;
use crate::error::LookupError;

/// Recompute label opacities of `focus` for a camera position in its frame.
///
/// Only the focused body's labels are ever shown, so only they are updated.
pub fn update_labels(
    registry: &mut BodyRegistry,
    focus: &str,
    camera: DVec3,
    thresholds: &LabelThresholds,
    scene: &mut SceneGraph,
) -> Result<(), LookupError> {
    let body = registry.get_mut(focus)?;
    if body.labels().is_shown() {
        body.update_labels(camera, thresholds, scene);
    }
    Ok(())
}
