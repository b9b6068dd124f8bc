pub mod api;
pub mod assets;
pub mod bodies;
pub mod core;
pub mod error;
pub mod labels;
pub mod math;
pub mod renderer;
pub mod systems;

pub use glam;

// Re-export key types at crate root for convenience
pub use api::config::{LabelThresholds, SimulationConfig, SpeedConfig};
pub use api::orrery::Orrery;
pub use api::types::{NodeId, TextureHandle};
pub use assets::{
    AssetLoadGate, GateState, PendingTextures, QueuedLoader, TextureLoader, TextureRequest,
    TrackingLoader,
};
pub use bodies::{
    normalise_distance, normalise_radius, BodyCatalog, BodyDescriptor, BodyKind, BodyTextures,
    CelestialBody, PointOfInterest, TexturePaths,
};
pub use crate::core::hierarchy::{build, validate, BuildContext, SolarSystem};
pub use crate::core::registry::BodyRegistry;
pub use crate::core::scene::{LocalTransform, SceneGraph, SceneNode, Shading, Surface, Visual};
pub use crate::core::time::SimulationClock;
pub use error::{BuildError, LookupError, SceneError};
pub use labels::{label_opacity, label_position, Label, LabelSet};
pub use math::Rng;
pub use renderer::{NodeTransform, TransformBuffer};
pub use systems::labels::update_labels;
pub use systems::motion::tick_bodies;
