//! Runtime celestial body: normalised geometry, phase, and its scene nodes.

use std::f64::consts::FRAC_PI_2;

use glam::DVec3;

use crate::api::config::{LabelThresholds, SimulationConfig};
use crate::api::types::{NodeId, TextureHandle};
use crate::assets::gate::AssetLoadGate;
use crate::assets::loader::TextureLoader;
use crate::bodies::descriptor::{BodyDescriptor, BodyKind, TexturePaths};
use crate::core::hierarchy::BuildContext;
use crate::core::scene::{LocalTransform, SceneGraph, Shading, Surface, Visual};
use crate::error::BuildError;
use crate::labels::LabelSet;

/// Inner edge of a ring as a fraction of its outer radius.
const RING_INNER_FRACTION: f64 = 0.4;

/// Closest the camera may orbit a focused body, in body radii.
const MIN_CAMERA_DISTANCE_RADII: f64 = 4.0;

/// Display radius: square root compresses the star/moon size range.
pub fn normalise_radius(radius_km: f64, config: &SimulationConfig) -> f64 {
    radius_km.max(0.0).sqrt() / config.radius_divisor
}

/// Display orbit radius. Moons keep their descriptor distance; everything
/// else goes through the compression curve, which preserves ordering.
pub fn normalise_distance(distance: f64, kind: BodyKind, config: &SimulationConfig) -> f64 {
    match kind {
        BodyKind::Moon => distance,
        _ => config.distance_scale * distance.max(0.0).powf(config.distance_exponent),
    }
}

/// Handles for every texture a body requested.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyTextures {
    pub map: TextureHandle,
    pub bump: Option<TextureHandle>,
    pub specular: Option<TextureHandle>,
    pub atmosphere: Option<TextureHandle>,
    pub atmosphere_alpha: Option<TextureHandle>,
}

impl BodyTextures {
    /// Request every named texture, map first. Each request must be admitted
    /// by the gate before it reaches the loader.
    fn load(
        body: &str,
        paths: &TexturePaths,
        loader: &mut dyn TextureLoader,
        gate: &mut AssetLoadGate,
    ) -> Result<Self, BuildError> {
        let mut request = |path: &str| {
            if !gate.note_requested() {
                return Err(BuildError::UnregisteredTexture {
                    body: body.to_string(),
                    path: path.to_string(),
                });
            }
            Ok(loader.request_load(path))
        };

        let map = request(paths.map.as_str())?;
        let mut load = |path: &Option<String>| path.as_deref().map(&mut request).transpose();
        Ok(Self {
            map,
            bump: load(&paths.bump)?,
            specular: load(&paths.specular)?,
            atmosphere: load(&paths.atmosphere)?,
            atmosphere_alpha: load(&paths.atmosphere_alpha)?,
        })
    }
}

/// A star, planet, moon, or ring in the running simulation.
///
/// Owns one body node plus optional atmosphere, orbit-path, and label nodes.
/// The body node is attached under the parent's body node by the hierarchy
/// builder, so `tick` only ever writes parent-relative coordinates.
#[derive(Debug, Clone)]
pub struct CelestialBody {
    name: String,
    kind: BodyKind,
    /// Normalised display radius.
    radius: f64,
    /// Normalised orbit radius around the parent.
    distance: f64,
    /// Orbital period in days (resolved; never a tidal-lock placeholder).
    period: f64,
    /// Rotation period in hours.
    daylength: f64,
    /// Axial tilt in radians.
    tilt: f64,
    phase_offset: f64,
    time_factor: f64,
    orbits: Option<String>,
    traversable: bool,
    textures: BodyTextures,
    node: NodeId,
    atmosphere: Option<NodeId>,
    path: Option<NodeId>,
    labels: LabelSet,
}

impl CelestialBody {
    /// Build the entity and its nodes. The body node is left detached.
    ///
    /// `descriptor.period` must already be resolved by the caller when the
    /// body is tidally locked.
    pub fn new(
        descriptor: &BodyDescriptor,
        parent: Option<&CelestialBody>,
        ctx: &mut BuildContext<'_>,
    ) -> Result<Self, BuildError> {
        if descriptor.textures.map.is_empty() {
            return Err(BuildError::MissingMapTexture(descriptor.name.clone()));
        }

        let config = ctx.config;
        let kind = descriptor.kind;
        let radius = normalise_radius(descriptor.radius, config);
        let distance = normalise_distance(descriptor.distance, kind, config);
        let tilt = descriptor.tilt.to_radians();
        let phase_offset = descriptor.offset.unwrap_or_else(|| ctx.rng.next_angle());
        let textures = BodyTextures::load(
            &descriptor.name,
            &descriptor.textures,
            &mut *ctx.loader,
            &mut *ctx.gate,
        )?;

        let node = Self::create_body_node(ctx.scene, descriptor, kind, radius, tilt, &textures);

        let atmosphere = match textures.atmosphere {
            Some(map) => {
                let shell = ctx.scene.spawn(
                    format!("{} atmosphere", descriptor.name),
                    Visual::Sphere {
                        radius: radius + config.atmosphere_offset,
                        surface: Surface {
                            map,
                            bump: None,
                            specular: None,
                            alpha: textures.atmosphere_alpha,
                            shading: Shading::Lit,
                        },
                    },
                );
                ctx.scene.attach_child(node, shell)?;
                Some(shell)
            }
            None => None,
        };

        let path = (kind == BodyKind::Planet).then(|| {
            let path = ctx.scene.spawn_with(
                format!("{} orbit", descriptor.name),
                Visual::OrbitPath,
                LocalTransform::new().with_scale(DVec3::splat(distance)),
            );
            ctx.scene.set_visible(path, false);
            path
        });

        let mut labels = LabelSet::new(radius);
        for poi in &descriptor.labels {
            labels.create_poi_label(ctx.scene, node, poi)?;
        }

        log::debug!(
            "created {} `{}` (radius {:.4}, distance {:.4}, {} textures)",
            kind,
            descriptor.name,
            radius,
            distance,
            descriptor.textures.count()
        );

        Ok(Self {
            name: descriptor.name.clone(),
            kind,
            radius,
            distance,
            period: descriptor.period,
            daylength: descriptor.daylength,
            tilt,
            phase_offset,
            time_factor: config.time_factor(),
            orbits: parent.map(|p| p.name.clone()),
            traversable: descriptor.traversable,
            textures,
            node,
            atmosphere,
            path,
            labels,
        })
    }

    fn create_body_node(
        scene: &mut SceneGraph,
        descriptor: &BodyDescriptor,
        kind: BodyKind,
        radius: f64,
        tilt: f64,
        textures: &BodyTextures,
    ) -> NodeId {
        let surface = Surface {
            map: textures.map,
            bump: textures.bump,
            specular: textures.specular,
            alpha: None,
            shading: match kind {
                BodyKind::Star => Shading::Emissive,
                _ => Shading::Lit,
            },
        };

        let (visual, rotation) = match kind {
            // Rings are laid flat in the orbital plane before tilting.
            BodyKind::Ring => (
                Visual::Ring {
                    inner_radius: radius * RING_INNER_FRACTION,
                    outer_radius: radius,
                    surface,
                },
                DVec3::new(FRAC_PI_2 + tilt, 0.0, 0.0),
            ),
            _ => (Visual::Sphere { radius, surface }, DVec3::new(tilt, 0.0, 0.0)),
        };

        scene.spawn_with(
            descriptor.name.clone(),
            visual,
            LocalTransform::new().with_rotation(rotation),
        )
    }

    /// Self-rotation angle after `elapsed` simulated seconds.
    /// Unbounded; consumers are periodic.
    pub fn rotation_angle(&self, elapsed: f64) -> f64 {
        if self.daylength == 0.0 {
            return 0.0;
        }
        elapsed * self.time_factor / self.daylength
    }

    /// Orbital phase after `elapsed` simulated seconds, including the phase offset.
    /// Static bodies (daylength 0) and a root without a period stay at the offset.
    pub fn orbital_angle(&self, elapsed: f64) -> f64 {
        if self.daylength == 0.0 || self.period == 0.0 {
            return self.phase_offset;
        }
        elapsed * self.time_factor / (self.period * 24.0) + self.phase_offset
    }

    /// Write this body's parent-relative position and spin for time `elapsed`.
    ///
    /// Reads nothing but this body's own state: the parent's motion reaches
    /// the child through the node tree.
    pub fn tick(&self, elapsed: f64, scene: &mut SceneGraph) {
        let rotation = self.rotation_angle(elapsed);
        let orbit = self.orbital_angle(elapsed);

        let Some(local) = scene.local_mut(self.node) else {
            return;
        };
        local.position.x = orbit.sin() * self.distance;
        local.position.z = orbit.cos() * self.distance;

        match self.kind {
            BodyKind::Ring => local.rotation.z = rotation,
            _ => local.rotation.y = rotation,
        }
    }

    pub fn show_labels(&mut self, scene: &mut SceneGraph) {
        self.labels.show(scene);
    }

    pub fn hide_labels(&mut self, scene: &mut SceneGraph) {
        self.labels.hide(scene);
    }

    /// Refresh label opacities for a camera position in this body's frame.
    pub fn update_labels(
        &mut self,
        camera: DVec3,
        thresholds: &LabelThresholds,
        scene: &mut SceneGraph,
    ) {
        self.labels.update(camera, thresholds, scene);
    }

    /// Closest distance the camera may approach when this body is focused.
    pub fn min_camera_distance(&self) -> f64 {
        self.radius * MIN_CAMERA_DISTANCE_RADII
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> BodyKind {
        self.kind
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    pub fn distance(&self) -> f64 {
        self.distance
    }

    pub fn period(&self) -> f64 {
        self.period
    }

    pub fn daylength(&self) -> f64 {
        self.daylength
    }

    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    pub fn phase_offset(&self) -> f64 {
        self.phase_offset
    }

    pub fn orbits(&self) -> Option<&str> {
        self.orbits.as_deref()
    }

    pub fn is_traversable(&self) -> bool {
        self.traversable
    }

    pub fn textures(&self) -> &BodyTextures {
        &self.textures
    }

    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn atmosphere_node(&self) -> Option<NodeId> {
        self.atmosphere
    }

    pub fn path_node(&self) -> Option<NodeId> {
        self.path
    }

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }
}
