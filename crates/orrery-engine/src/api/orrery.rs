use glam::DVec3;

use crate::api::config::SimulationConfig;
use crate::api::types::{NodeId, TextureHandle};
use crate::assets::gate::AssetLoadGate;
use crate::assets::loader::{PendingTextures, TextureLoader, TrackingLoader};
use crate::bodies::celestial::CelestialBody;
use crate::bodies::descriptor::{BodyCatalog, BodyKind};
use crate::core::hierarchy::{build, BuildContext};
use crate::core::registry::BodyRegistry;
use crate::core::scene::{LocalTransform, SceneGraph, Visual};
use crate::core::time::SimulationClock;
use crate::error::{BuildError, LookupError};
use crate::math::Rng;
use crate::renderer::buffer::TransformBuffer;
use crate::systems::{labels, motion};

/// Default camera offset from a newly focused body, in body radii.
const FOCUS_CAMERA_RADII: f64 = 6.0;

/// One simulation run: the body hierarchy, its clock, its load gate, and the
/// focus/camera state driving label visibility.
///
/// Everything a run touches is owned here, so two runs never share state.
pub struct Orrery {
    config: SimulationConfig,
    scene: SceneGraph,
    registry: BodyRegistry,
    traversable: Vec<String>,
    clock: SimulationClock,
    gate: AssetLoadGate,
    pending: PendingTextures,
    focused: String,
    /// Position of `focused` in `traversable`, if it is traversable.
    focus_index: Option<usize>,
    camera_anchor: NodeId,
    show_labels: bool,
    show_paths: bool,
    show_moons: bool,
    transforms: TransformBuffer,
}

impl Orrery {
    /// Build a run from a catalog. Every texture is requested through `loader`
    /// and reported back with [`Orrery::texture_loaded`].
    pub fn new(
        config: SimulationConfig,
        catalog: &BodyCatalog,
        loader: &mut dyn TextureLoader,
        mut gate: AssetLoadGate,
    ) -> Result<Self, BuildError> {
        config.validate()?;
        let mut scene = SceneGraph::new();
        let mut pending = PendingTextures::new();
        let mut rng = Rng::new(config.seed);

        let system = {
            let mut tracking = TrackingLoader::new(loader, &mut pending);
            let mut ctx = BuildContext {
                scene: &mut scene,
                gate: &mut gate,
                loader: &mut tracking,
                rng: &mut rng,
                config: &config,
            };
            build(&catalog.bodies, &mut ctx)?
        };

        let focused = match &config.initial_focus {
            Some(name) => system.registry.get(name)?.name().to_string(),
            None => system
                .registry
                .root()
                .ok_or(BuildError::MissingRoot)?
                .name()
                .to_string(),
        };
        let focus_index = system.traversable.iter().position(|n| *n == focused);
        let camera_anchor = scene.spawn("camera", Visual::CameraAnchor);

        let mut orrery = Self {
            clock: SimulationClock::new(config.speed),
            config,
            scene,
            registry: system.registry,
            traversable: system.traversable,
            gate,
            pending,
            focused: String::new(),
            focus_index,
            camera_anchor,
            show_labels: true,
            show_paths: false,
            show_moons: true,
            transforms: TransformBuffer::new(),
        };
        orrery.move_focus(&focused)?;
        orrery.frame(0.0);

        log::info!("orrery ready to run, focused on `{}`", orrery.focused);
        Ok(orrery)
    }

    /// Advance by `real_dt` seconds of wall time and refresh the render export.
    pub fn frame(&mut self, real_dt: f64) {
        let elapsed = self.clock.advance(real_dt);
        motion::tick_bodies(&self.registry, &mut self.scene, elapsed);

        let camera = self.camera_position();
        if let Err(e) = labels::update_labels(
            &mut self.registry,
            &self.focused,
            camera,
            &self.config.labels,
            &mut self.scene,
        ) {
            log::warn!("label update skipped: {e}");
        }

        self.transforms.rebuild(&self.scene);
    }

    /// Report one finished texture. Unknown and repeated handles are ignored.
    pub fn texture_loaded(&mut self, handle: TextureHandle) -> bool {
        match self.pending.complete(handle) {
            Some(path) => {
                log::debug!("texture loaded: {path}");
                self.gate.notify_one_completed()
            }
            None => {
                log::warn!("ignoring completion for unknown texture {handle:?}");
                false
            }
        }
    }

    // -- Focus and camera --

    /// Focus the next traversable body, wrapping around.
    pub fn focus_next(&mut self) -> &str {
        self.step_focus(1);
        &self.focused
    }

    /// Focus the previous traversable body, wrapping around.
    pub fn focus_previous(&mut self) -> &str {
        self.step_focus(-1);
        &self.focused
    }

    fn step_focus(&mut self, step: isize) {
        let len = self.traversable.len();
        if len == 0 {
            return;
        }
        let next = match self.focus_index {
            Some(i) => (i as isize + step).rem_euclid(len as isize) as usize,
            None if step < 0 => len - 1,
            None => 0,
        };
        let name = self.traversable[next].clone();
        if let Err(e) = self.move_focus(&name) {
            log::error!("cannot focus `{name}`: {e}");
        }
    }

    /// Focus any body by name, traversable or not.
    pub fn focus(&mut self, name: &str) -> Result<(), LookupError> {
        self.move_focus(name)
    }

    fn move_focus(&mut self, name: &str) -> Result<(), LookupError> {
        let node = self.registry.get(name)?.node();

        if let Ok(previous) = self.registry.get_mut(&self.focused) {
            previous.hide_labels(&mut self.scene);
        }

        let target = self.registry.get_mut(name)?;
        if self.show_labels {
            target.show_labels(&mut self.scene);
        }
        let offset = DVec3::new(0.0, 0.0, target.radius() * FOCUS_CAMERA_RADII);

        if self.scene.attach_child(node, self.camera_anchor).is_err() {
            return Err(LookupError::UnknownBody(name.to_string()));
        }
        if let Some(local) = self.scene.local_mut(self.camera_anchor) {
            *local = LocalTransform::new().with_position(offset);
        }

        self.focused = name.to_string();
        self.focus_index = self.traversable.iter().position(|n| n == name);
        log::debug!("focus moved to `{name}`");
        Ok(())
    }

    pub fn focused(&self) -> &str {
        &self.focused
    }

    pub fn focused_body(&self) -> Result<&CelestialBody, LookupError> {
        self.registry.get(&self.focused)
    }

    /// Camera position in the focused body's frame.
    pub fn set_camera_position(&mut self, position: DVec3) {
        if let Some(local) = self.scene.local_mut(self.camera_anchor) {
            local.position = position;
        }
    }

    pub fn camera_position(&self) -> DVec3 {
        self.scene
            .local(self.camera_anchor)
            .map(|l| l.position)
            .unwrap_or(DVec3::ZERO)
    }

    /// Closest distance orbit controls may bring the camera to the focus.
    pub fn min_camera_distance(&self) -> f64 {
        self.focused_body()
            .map(|b| b.min_camera_distance())
            .unwrap_or(0.0)
    }

    // -- Speed and pause --

    pub fn set_speed(&mut self, speed: f64) {
        self.clock.set_speed(speed);
    }

    pub fn speed(&self) -> f64 {
        self.clock.speed()
    }

    pub fn pause(&mut self) {
        self.clock.pause();
    }

    pub fn resume(&mut self) {
        self.clock.resume();
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.clock.toggle_pause();
        self.clock.is_paused()
    }

    pub fn is_paused(&self) -> bool {
        self.clock.is_paused()
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    // -- View toggles --

    pub fn set_show_paths(&mut self, show: bool) {
        self.show_paths = show;
        for body in self.registry.iter() {
            if let Some(path) = body.path_node() {
                self.scene.set_visible(path, show);
            }
        }
    }

    /// Hides moon nodes along with everything attached to them.
    pub fn set_show_moons(&mut self, show: bool) {
        self.show_moons = show;
        for body in self.registry.iter() {
            if body.kind() == BodyKind::Moon {
                self.scene.set_visible(body.node(), show);
            }
        }
    }

    pub fn set_show_labels(&mut self, show: bool) {
        self.show_labels = show;
        if let Ok(body) = self.registry.get_mut(&self.focused) {
            if show {
                body.show_labels(&mut self.scene);
            } else {
                body.hide_labels(&mut self.scene);
            }
        }
    }

    pub fn show_paths(&self) -> bool {
        self.show_paths
    }

    pub fn show_moons(&self) -> bool {
        self.show_moons
    }

    pub fn show_labels(&self) -> bool {
        self.show_labels
    }

    // -- Status --

    pub fn is_ready(&self) -> bool {
        self.gate.is_ready()
    }

    pub fn progress(&self) -> f64 {
        self.gate.progress()
    }

    /// Stop reacting to texture completions. The scene stays readable.
    pub fn teardown(&mut self) {
        self.gate.teardown();
        log::info!("orrery torn down with {} textures pending", self.pending.len());
    }

    pub fn registry(&self) -> &BodyRegistry {
        &self.registry
    }

    pub fn scene(&self) -> &SceneGraph {
        &self.scene
    }

    pub fn traversable(&self) -> &[String] {
        &self.traversable
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn transforms(&self) -> &TransformBuffer {
        &self.transforms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::loader::QueuedLoader;
    use std::cell::Cell;
    use std::rc::Rc;

    const CATALOG: &str = r#"[
        { "name": "Sun", "radius": 696340, "daylength": 609.12, "type": "star",
          "textures": { "map": "textures/sun.jpg" }, "traversable": true },
        { "name": "Earth", "radius": 6371, "distance": 149.6, "period": 365.26,
          "daylength": 24, "type": "planet", "tilt": 23.44, "orbits": "Sun",
          "textures": { "map": "textures/earth.jpg", "atmosphere": "textures/clouds.jpg" },
          "labels": [ { "name": "Everest", "y": 0.0, "z": 0.0, "type": "mountain" } ],
          "traversable": true, "offset": 0.0 },
        { "name": "Moon", "radius": 1737.4, "distance": 0.5, "period": 0,
          "daylength": 655.7, "type": "moon", "orbits": "Earth",
          "textures": { "map": "textures/moon.jpg" }, "traversable": true, "offset": 1.0 },
        { "name": "Saturn Ring", "radius": 136775, "distance": 0, "period": 1,
          "daylength": 10.7, "type": "ring", "orbits": "Sun",
          "textures": { "map": "textures/ring.png" } }
    ]"#;

    fn orrery_with(config: SimulationConfig) -> (Orrery, QueuedLoader, Rc<Cell<u32>>) {
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let gate = AssetLoadGate::new().with_on_ready(move || counter.set(counter.get() + 1));
        let catalog = BodyCatalog::from_json(CATALOG).unwrap();
        let mut loader = QueuedLoader::new();
        let orrery = Orrery::new(config, &catalog, &mut loader, gate).unwrap();
        (orrery, loader, fired)
    }

    fn orrery() -> (Orrery, QueuedLoader, Rc<Cell<u32>>) {
        orrery_with(SimulationConfig::default())
    }

    #[test]
    fn builds_and_focuses_root() {
        let (orrery, loader, _) = orrery();
        assert_eq!(orrery.focused(), "Sun");
        assert_eq!(orrery.traversable(), &["Sun", "Earth", "Moon"]);
        assert_eq!(loader.len(), 5);
        assert!(!orrery.is_ready());
        assert_eq!(orrery.transforms().len(), orrery.scene().len());

        let sun = orrery.registry().get("Sun").unwrap().node();
        assert_eq!(orrery.scene().parent(orrery.camera_anchor), Some(sun));
    }

    #[test]
    fn gate_opens_once_after_every_texture() {
        let (mut orrery, mut loader, fired) = orrery();
        let requests = loader.drain();

        // Out of request order, with a repeat in the middle.
        for request in requests.iter().rev().take(2) {
            assert!(!orrery.texture_loaded(request.handle));
        }
        assert!(!orrery.texture_loaded(requests[4].handle));
        for request in requests.iter().rev().skip(2).take(2) {
            assert!(!orrery.texture_loaded(request.handle));
        }
        assert!((orrery.progress() - 0.8).abs() < 1e-12);
        assert!(orrery.texture_loaded(requests[0].handle));

        assert!(orrery.is_ready());
        assert_eq!(fired.get(), 1);
        assert!(!orrery.texture_loaded(TextureHandle(99)));
        assert_eq!(fired.get(), 1);
    }

    #[test]
    fn completions_after_teardown_are_ignored() {
        let (mut orrery, mut loader, fired) = orrery();
        orrery.teardown();
        for request in loader.drain() {
            orrery.texture_loaded(request.handle);
        }
        assert!(!orrery.is_ready());
        assert_eq!(fired.get(), 0);
    }

    #[test]
    fn focus_cycles_with_wraparound() {
        let (mut orrery, _, _) = orrery();
        assert_eq!(orrery.focus_next(), "Earth");
        assert_eq!(orrery.focus_next(), "Moon");
        assert_eq!(orrery.focus_next(), "Sun");
        assert_eq!(orrery.focus_previous(), "Moon");

        let moon = orrery.registry().get("Moon").unwrap().node();
        assert_eq!(orrery.scene().parent(orrery.camera_anchor), Some(moon));
    }

    #[test]
    fn focus_moves_labels() {
        let (mut orrery, _, _) = orrery();
        let everest = orrery
            .registry()
            .get("Earth")
            .unwrap()
            .labels()
            .iter()
            .next()
            .unwrap()
            .node;
        assert!(!orrery.scene().get(everest).unwrap().visible);

        orrery.focus("Earth").unwrap();
        assert!(orrery.scene().get(everest).unwrap().visible);

        orrery.focus("Saturn Ring").unwrap();
        assert!(!orrery.scene().get(everest).unwrap().visible);
        // Not traversable, so cycling restarts from the first entry.
        assert_eq!(orrery.focus_next(), "Sun");

        assert_eq!(
            orrery.focus("Pluto").unwrap_err(),
            LookupError::UnknownBody("Pluto".into())
        );
        assert_eq!(orrery.focused(), "Sun");
    }

    #[test]
    fn label_opacity_follows_camera() {
        let (mut orrery, _, _) = orrery();
        orrery.focus("Earth").unwrap();
        let earth = orrery.registry().get("Earth").unwrap();
        let radius = earth.radius();
        let label = earth.labels().iter().next().unwrap().node;

        // Everest sits on +X of the Earth frame.
        orrery.set_camera_position(DVec3::new(radius * 3.0, 0.0, 0.0));
        orrery.frame(0.0);
        assert_eq!(orrery.scene().get(label).unwrap().opacity, 1.0);

        orrery.set_camera_position(DVec3::new(-radius * 3.0, 0.0, 0.0));
        orrery.frame(0.0);
        assert_eq!(orrery.scene().get(label).unwrap().opacity, 0.0);

        orrery.set_camera_position(DVec3::new(radius * 20.0, 0.0, 0.0));
        orrery.frame(0.0);
        assert_eq!(orrery.scene().get(label).unwrap().opacity, 0.0);
    }

    #[test]
    fn moon_follows_earth_in_world_space() {
        let (mut orrery, _, _) = orrery();
        orrery.set_speed(1.0);
        orrery.frame(2.0);

        let registry = orrery.registry();
        let earth = registry.get("Earth").unwrap();
        let moon = registry.get("Moon").unwrap();
        let separation = orrery.scene().world_position(moon.node())
            - orrery.scene().world_position(earth.node());
        assert!((separation.length() - 0.5).abs() < 1e-9);
        // Tidally locked: period comes from the parent's day length.
        assert!((moon.period() - 655.7 / 24.0).abs() < 1e-9);
    }

    #[test]
    fn pause_freezes_time() {
        let (mut orrery, _, _) = orrery();
        orrery.frame(1.0);
        let elapsed = orrery.elapsed();
        assert!(orrery.toggle_pause());
        orrery.frame(5.0);
        assert_eq!(orrery.elapsed(), elapsed);
        orrery.resume();
        orrery.frame(1.0);
        assert!(orrery.elapsed() > elapsed);

        orrery.set_speed(1000.0);
        assert_eq!(orrery.speed(), 20.0);
    }

    #[test]
    fn toggles_hide_nodes() {
        let (mut orrery, _, _) = orrery();
        let earth = orrery.registry().get("Earth").unwrap();
        let path = earth.path_node().unwrap();
        let moon = orrery.registry().get("Moon").unwrap().node();

        assert!(!orrery.scene().get(path).unwrap().visible);
        orrery.set_show_paths(true);
        assert!(orrery.scene().get(path).unwrap().visible);

        orrery.set_show_moons(false);
        assert!(!orrery.scene().is_visible_in_tree(moon));
        orrery.frame(0.0);
        assert_eq!(orrery.transforms().entries()[moon.0 as usize].visible, 0.0);

        orrery.focus("Earth").unwrap();
        orrery.set_show_labels(false);
        let everest = orrery.registry().get("Earth").unwrap().labels().iter().next().unwrap().node;
        assert!(!orrery.scene().get(everest).unwrap().visible);
    }

    #[test]
    fn initial_focus_from_config() {
        let config = SimulationConfig {
            initial_focus: Some("Earth".into()),
            ..SimulationConfig::default()
        };
        let (orrery, _, _) = orrery_with(config);
        assert_eq!(orrery.focused(), "Earth");
        let expected = orrery.registry().get("Earth").unwrap().min_camera_distance();
        assert_eq!(orrery.min_camera_distance(), expected);
    }

    #[test]
    fn negative_speed_range_fails_the_build() {
        let mut config = SimulationConfig::default();
        config.speed.initial = -2.0;
        config.speed.min = -5.0;
        let catalog = BodyCatalog::from_json(CATALOG).unwrap();
        let mut loader = QueuedLoader::new();

        let result = Orrery::new(config, &catalog, &mut loader, AssetLoadGate::new());
        assert!(matches!(result, Err(BuildError::InvalidSpeedRange { .. })));
        assert!(loader.is_empty());
    }

    #[test]
    fn elapsed_time_never_decreases() {
        let (mut orrery, _, _) = orrery();
        orrery.set_speed(-10.0);
        let mut last = orrery.elapsed();
        for _ in 0..5 {
            orrery.frame(1.0);
            assert!(orrery.elapsed() > last);
            last = orrery.elapsed();
        }
    }

    #[test]
    fn unknown_initial_focus_fails_the_build() {
        let config = SimulationConfig {
            initial_focus: Some("Vulcan".into()),
            ..SimulationConfig::default()
        };
        let catalog = BodyCatalog::from_json(CATALOG).unwrap();
        let mut loader = QueuedLoader::new();
        let result = Orrery::new(config, &catalog, &mut loader, AssetLoadGate::new());
        assert!(matches!(result, Err(BuildError::Lookup(_))));
    }
}
