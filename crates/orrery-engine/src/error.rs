//! Error types for building and querying a simulation.

use crate::api::types::NodeId;

/// Fatal configuration errors raised while building the body hierarchy.
///
/// Every variant aborts the build: silently re-rooting a body or guessing a
/// period would corrupt the positions of its whole subtree.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The body catalog or config JSON could not be parsed.
    #[error("failed to parse body data: {0}")]
    Parse(#[from] serde_json::Error),

    /// A descriptor names a body type outside star/planet/moon/ring.
    #[error("unknown body type `{0}`")]
    UnknownKind(String),

    /// Two descriptors share a name.
    #[error("duplicate body name `{0}`")]
    DuplicateName(String),

    /// No descriptor is free of an `orbits` reference.
    #[error("no root body: every descriptor orbits another body")]
    MissingRoot,

    /// More than one descriptor lacks an `orbits` reference.
    #[error("multiple root bodies: `{first}` and `{second}`")]
    MultipleRoots { first: String, second: String },

    /// `orbits` names a body that is not defined earlier in the catalog.
    #[error("`{body}` orbits `{parent}`, which is not defined before it")]
    UnresolvedParent { body: String, parent: String },

    /// A tidally locked body (period 0) orbits a parent that does not rotate.
    #[error("cannot derive the period of `{body}`: parent `{parent}` has a daylength of 0")]
    ZeroParentDaylength { body: String, parent: String },

    /// The mandatory `map` texture is missing or empty.
    #[error("`{0}` has no map texture")]
    MissingMapTexture(String),

    /// A texture was about to be requested before the gate knew the total.
    #[error("texture `{path}` of `{body}` requested outside the registered texture total")]
    UnregisteredTexture { body: String, path: String },

    /// The speed multiplier range is empty or not strictly positive.
    #[error("invalid speed range [{min}, {max}]: bounds must be positive and min <= max")]
    InvalidSpeedRange { min: f64, max: f64 },

    /// A scene graph operation failed during attachment.
    #[error("scene error: {0}")]
    Scene(#[from] SceneError),

    /// Registry lookup failed while resolving a parent.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Errors from scene graph manipulation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    /// The node id does not belong to this graph.
    #[error("unknown scene node {0:?}")]
    UnknownNode(NodeId),

    /// Attaching would make a node its own ancestor.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    Cycle { parent: NodeId, child: NodeId },
}

/// Failed lookup by body name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("no body named `{0}`")]
    UnknownBody(String),
}
