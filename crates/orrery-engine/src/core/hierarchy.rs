// core/hierarchy.rs
//
// Builds the body hierarchy from an ordered catalog:
//   validate -> register texture total with the gate -> construct in order,
//   attaching each body node under its parent's node.

use std::borrow::Cow;
use std::collections::HashMap;

use crate::api::config::SimulationConfig;
use crate::assets::gate::AssetLoadGate;
use crate::assets::loader::TextureLoader;
use crate::bodies::celestial::CelestialBody;
use crate::bodies::descriptor::BodyDescriptor;
use crate::core::registry::BodyRegistry;
use crate::core::scene::SceneGraph;
use crate::error::BuildError;
use crate::math::Rng;

/// Everything a build touches, owned by the caller for one simulation run.
pub struct BuildContext<'a> {
    pub scene: &'a mut SceneGraph,
    pub gate: &'a mut AssetLoadGate,
    pub loader: &'a mut dyn TextureLoader,
    pub rng: &'a mut Rng,
    pub config: &'a SimulationConfig,
}

/// Result of a successful build.
#[derive(Debug, Clone, Default)]
pub struct SolarSystem {
    pub registry: BodyRegistry,
    /// Bodies eligible for focus navigation, in catalog order.
    pub traversable: Vec<String>,
}

/// Check the catalog invariants without touching any collaborator.
///
/// - names are unique,
/// - exactly one body has no parent,
/// - every parent is defined earlier in the list,
/// - every body has a map texture,
/// - a tidally locked body (period 0) orbits a parent that rotates.
pub fn validate(descriptors: &[BodyDescriptor]) -> Result<(), BuildError> {
    let mut daylengths: HashMap<&str, f64> = HashMap::with_capacity(descriptors.len());
    let mut root: Option<&str> = None;

    for descriptor in descriptors {
        let name = descriptor.name.as_str();
        if daylengths.contains_key(name) {
            return Err(BuildError::DuplicateName(name.to_string()));
        }
        if descriptor.textures.map.is_empty() {
            return Err(BuildError::MissingMapTexture(name.to_string()));
        }

        match descriptor.orbits.as_deref() {
            None => {
                if let Some(first) = root {
                    return Err(BuildError::MultipleRoots {
                        first: first.to_string(),
                        second: name.to_string(),
                    });
                }
                root = Some(name);
            }
            Some(parent) => {
                let Some(&parent_daylength) = daylengths.get(parent) else {
                    return Err(BuildError::UnresolvedParent {
                        body: name.to_string(),
                        parent: parent.to_string(),
                    });
                };
                if descriptor.period == 0.0 && parent_daylength == 0.0 {
                    return Err(BuildError::ZeroParentDaylength {
                        body: name.to_string(),
                        parent: parent.to_string(),
                    });
                }
            }
        }

        daylengths.insert(name, descriptor.daylength);
    }

    match root {
        Some(_) => Ok(()),
        None => Err(BuildError::MissingRoot),
    }
}

/// Replace a tidal-lock placeholder period (0) with the daylength ratio to the parent.
fn resolve_period<'d>(
    descriptor: &'d BodyDescriptor,
    parent: Option<&CelestialBody>,
) -> Result<Cow<'d, BodyDescriptor>, BuildError> {
    let Some(parent) = parent else {
        return Ok(Cow::Borrowed(descriptor));
    };
    if descriptor.period != 0.0 {
        return Ok(Cow::Borrowed(descriptor));
    }
    if parent.daylength() == 0.0 {
        return Err(BuildError::ZeroParentDaylength {
            body: descriptor.name.clone(),
            parent: parent.name().to_string(),
        });
    }

    let mut resolved = descriptor.clone();
    resolved.period = descriptor.daylength / parent.daylength();
    log::debug!(
        "`{}` is tidally locked to `{}`: period {}",
        resolved.name,
        parent.name(),
        resolved.period
    );
    Ok(Cow::Owned(resolved))
}

/// Build every body in catalog order and wire the node tree.
///
/// The texture total is registered with the gate before the first request so
/// the completed count can never reach a target that is still being summed.
pub fn build(
    descriptors: &[BodyDescriptor],
    ctx: &mut BuildContext<'_>,
) -> Result<SolarSystem, BuildError> {
    validate(descriptors)?;

    let total: usize = descriptors.iter().map(|d| d.textures.count()).sum();
    ctx.gate.set_required(total);

    let mut registry = BodyRegistry::new();
    let mut traversable = Vec::new();
    let scene_root = ctx.scene.root();

    for descriptor in descriptors {
        let parent = match descriptor.orbits.as_deref() {
            Some(name) => Some(registry.get(name)?),
            None => None,
        };
        let resolved = resolve_period(descriptor, parent)?;
        let body = CelestialBody::new(&resolved, parent, ctx)?;

        let anchor = parent.map(|p| p.node()).unwrap_or(scene_root);
        ctx.scene.attach_child(anchor, body.node())?;
        if let Some(path) = body.path_node() {
            ctx.scene.attach_child(anchor, path)?;
        }

        if body.is_traversable() {
            traversable.push(body.name().to_string());
        }
        registry
            .insert(body)
            .map_err(|b| BuildError::DuplicateName(b.name().to_string()))?;
    }

    log::info!(
        "built {} bodies ({} traversable, {} textures requested)",
        registry.len(),
        traversable.len(),
        total
    );

    Ok(SolarSystem {
        registry,
        traversable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::gate::GateState;
    use crate::assets::loader::QueuedLoader;
    use crate::bodies::descriptor::{BodyKind, TexturePaths};

    struct Fixture {
        scene: SceneGraph,
        gate: AssetLoadGate,
        loader: QueuedLoader,
        rng: Rng,
        config: SimulationConfig,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                scene: SceneGraph::new(),
                gate: AssetLoadGate::new(),
                loader: QueuedLoader::new(),
                rng: Rng::new(3),
                config: SimulationConfig::default(),
            }
        }

        fn build(&mut self, descriptors: &[BodyDescriptor]) -> Result<SolarSystem, BuildError> {
            let mut ctx = BuildContext {
                scene: &mut self.scene,
                gate: &mut self.gate,
                loader: &mut self.loader,
                rng: &mut self.rng,
                config: &self.config,
            };
            build(descriptors, &mut ctx)
        }
    }

    fn three_bodies() -> Vec<BodyDescriptor> {
        vec![
            BodyDescriptor::new("Star", BodyKind::Star, 696340.0)
                .with_daylength(609.12)
                .traversable(),
            BodyDescriptor::new("Planet", BodyKind::Planet, 6371.0)
                .orbiting("Star")
                .with_distance(100.0)
                .with_period(200.0)
                .with_daylength(24.0)
                .traversable(),
            BodyDescriptor::new("Moon", BodyKind::Moon, 1737.0)
                .orbiting("Planet")
                .with_distance(0.5)
                .with_period(10.0)
                .with_daylength(240.0),
        ]
    }

    #[test]
    fn builds_nested_hierarchy() {
        let mut fx = Fixture::new();
        let system = fx.build(&three_bodies()).unwrap();

        assert_eq!(system.registry.len(), 3);
        let star = system.registry.get("Star").unwrap().node();
        let planet = system.registry.get("Planet").unwrap().node();
        let moon = system.registry.get("Moon").unwrap().node();

        assert_eq!(fx.scene.parent(star), Some(fx.scene.root()));
        assert_eq!(fx.scene.parent(planet), Some(star));
        assert_eq!(fx.scene.parent(moon), Some(planet));
        assert!(fx.scene.is_descendant_of(moon, star));
        assert!(!fx.scene.children(fx.scene.root()).contains(&moon));
        assert!(!fx.scene.children(fx.scene.root()).contains(&planet));

        assert_eq!(system.traversable, vec!["Star".to_string(), "Planet".to_string()]);
    }

    #[test]
    fn orbit_path_hangs_under_parent() {
        let mut fx = Fixture::new();
        let system = fx.build(&three_bodies()).unwrap();
        let planet = system.registry.get("Planet").unwrap();
        let star = system.registry.get("Star").unwrap();
        assert_eq!(fx.scene.parent(planet.path_node().unwrap()), Some(star.node()));
    }

    #[test]
    fn child_world_position_follows_parent() {
        let mut fx = Fixture::new();
        let system = fx.build(&three_bodies()).unwrap();
        for body in system.registry.iter() {
            body.tick(5.0, &mut fx.scene);
        }
        let planet = system.registry.get("Planet").unwrap();
        let moon = system.registry.get("Moon").unwrap();

        let planet_world = fx.scene.world_position(planet.node());
        let moon_world = fx.scene.world_position(moon.node());
        let separation = (moon_world - planet_world).length();
        assert!((separation - 0.5).abs() < 1e-9, "separation was {separation}");
    }

    #[test]
    fn tidal_lock_period_is_daylength_ratio() {
        let mut fx = Fixture::new();
        let descriptors = vec![
            BodyDescriptor::new("Earth", BodyKind::Planet, 6371.0).with_daylength(24.0),
            BodyDescriptor::new("Moon", BodyKind::Moon, 1737.0)
                .orbiting("Earth")
                .with_distance(0.4)
                .with_daylength(24.0),
        ];
        let system = fx.build(&descriptors).unwrap();
        assert_eq!(system.registry.get("Moon").unwrap().period(), 1.0);
    }

    #[test]
    fn registers_texture_total_before_loading() {
        let mut fx = Fixture::new();
        let mut descriptors = three_bodies();
        descriptors[1].textures = TexturePaths {
            map: "planet.jpg".into(),
            bump: Some("planet_bump.jpg".into()),
            atmosphere: Some("clouds.jpg".into()),
            ..TexturePaths::default()
        };
        // Every request is admitted against the registered total, so a build
        // that registered late would fail on its first texture.
        fx.build(&descriptors).unwrap();

        assert_eq!(fx.loader.len(), 5);
        assert_eq!(fx.gate.requested(), 5);
        assert_eq!(
            fx.gate.state(),
            GateState::Loading {
                required: 5,
                completed: 0
            }
        );
        for _ in 0..5 {
            fx.gate.notify_one_completed();
        }
        assert!(fx.gate.is_ready());
    }

    #[test]
    fn unresolved_parent_fails_before_any_request() {
        let mut fx = Fixture::new();
        let mut descriptors = three_bodies();
        descriptors.swap(1, 2);

        let err = fx.build(&descriptors).unwrap_err();
        assert!(matches!(
            err,
            BuildError::UnresolvedParent { ref body, ref parent } if body == "Moon" && parent == "Planet"
        ));
        assert!(fx.loader.is_empty());
        assert_eq!(fx.scene.len(), 1);
    }

    #[test]
    fn zero_parent_daylength_fails() {
        let descriptors = vec![
            BodyDescriptor::new("Star", BodyKind::Star, 1.0),
            BodyDescriptor::new("Rock", BodyKind::Moon, 1.0)
                .orbiting("Star")
                .with_daylength(10.0),
        ];
        assert!(matches!(
            validate(&descriptors),
            Err(BuildError::ZeroParentDaylength { .. })
        ));
    }

    #[test]
    fn root_count_is_enforced() {
        assert!(matches!(validate(&[]), Err(BuildError::MissingRoot)));

        let two_roots = vec![
            BodyDescriptor::new("A", BodyKind::Star, 1.0),
            BodyDescriptor::new("B", BodyKind::Star, 1.0),
        ];
        assert!(matches!(
            validate(&two_roots),
            Err(BuildError::MultipleRoots { ref first, ref second }) if first == "A" && second == "B"
        ));
    }

    #[test]
    fn duplicate_names_fail() {
        let descriptors = vec![
            BodyDescriptor::new("Sun", BodyKind::Star, 1.0).with_daylength(1.0),
            BodyDescriptor::new("Sun", BodyKind::Planet, 1.0).orbiting("Sun"),
        ];
        assert!(matches!(
            validate(&descriptors),
            Err(BuildError::DuplicateName(ref n)) if n == "Sun"
        ));
    }

    #[test]
    fn self_orbit_is_unresolved() {
        let descriptors = vec![
            BodyDescriptor::new("Sun", BodyKind::Star, 1.0),
            BodyDescriptor::new("Loop", BodyKind::Planet, 1.0).orbiting("Loop"),
        ];
        assert!(matches!(
            validate(&descriptors),
            Err(BuildError::UnresolvedParent { .. })
        ));
    }
}
