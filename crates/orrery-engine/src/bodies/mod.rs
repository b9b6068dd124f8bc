pub mod celestial;
pub mod descriptor;

pub use celestial::{normalise_distance, normalise_radius, BodyTextures, CelestialBody};
pub use descriptor::{BodyCatalog, BodyDescriptor, BodyKind, PointOfInterest, TexturePaths};
