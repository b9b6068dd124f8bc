//! Label opacity from camera geometry.
//!
//! Both inputs are expressed in the owning body's local frame: the camera
//! anchor is a child of the focused body, and labels are children of it too.

use glam::DVec3;

use crate::api::config::LabelThresholds;

/// Linear fade: 1 up to `fade`, 0 beyond `hide`, linear in between.
pub fn ramp(value: f64, fade: f64, hide: f64) -> f64 {
    if value > hide {
        0.0
    } else if value > fade {
        (hide - value) / (hide - fade)
    } else {
        1.0
    }
}

/// Great-circle angle between two directions, in `[0, π]`.
/// Zero-length inputs count as perpendicular.
pub fn angle_between(a: DVec3, b: DVec3) -> f64 {
    let dot = a.normalize_or_zero().dot(b.normalize_or_zero());
    dot.clamp(-1.0, 1.0).acos()
}

/// Opacity from how far the label has turned away from the camera.
pub fn rotation_opacity(camera: DVec3, label: DVec3, thresholds: &LabelThresholds) -> f64 {
    let delta = angle_between(camera, label);
    ramp(delta, thresholds.fade_angle, thresholds.hide_angle)
}

/// Opacity from camera distance, relative to the body radius.
pub fn distance_opacity(camera: DVec3, radius: f64, thresholds: &LabelThresholds) -> f64 {
    ramp(
        camera.length(),
        radius * thresholds.fade_radii,
        radius * thresholds.hide_radii,
    )
}

/// Final label opacity: both terms must be visible for the label to show.
pub fn label_opacity(
    camera: DVec3,
    label: DVec3,
    radius: f64,
    thresholds: &LabelThresholds,
) -> f64 {
    rotation_opacity(camera, label, thresholds) * distance_opacity(camera, radius, thresholds)
}
