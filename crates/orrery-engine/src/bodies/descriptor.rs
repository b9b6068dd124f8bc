use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BuildError;

/// Kind of celestial body. Drives normalisation, shading and spin axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum BodyKind {
    Star,
    Planet,
    Moon,
    Ring,
}

impl BodyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            BodyKind::Star => "star",
            BodyKind::Planet => "planet",
            BodyKind::Moon => "moon",
            BodyKind::Ring => "ring",
        }
    }
}

impl FromStr for BodyKind {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "star" => Ok(BodyKind::Star),
            "planet" => Ok(BodyKind::Planet),
            "moon" => Ok(BodyKind::Moon),
            "ring" => Ok(BodyKind::Ring),
            other => Err(BuildError::UnknownKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for BodyKind {
    type Error = BuildError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BodyKind> for String {
    fn from(kind: BodyKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for BodyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Static description of one body, as read from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BodyDescriptor {
    /// Unique name; also the registry key.
    pub name: String,
    /// Physical radius in kilometres.
    pub radius: f64,
    /// Orbital distance in million kilometres (unused for rings).
    #[serde(default)]
    pub distance: f64,
    /// Orbital period in days. 0 derives it from the parent's daylength.
    #[serde(default)]
    pub period: f64,
    /// Rotation period in hours. 0 means the body neither spins nor orbits.
    #[serde(default)]
    pub daylength: f64,
    #[serde(rename = "type")]
    pub kind: BodyKind,
    /// Axial tilt in degrees.
    #[serde(default)]
    pub tilt: f64,
    /// Name of the parent body. Absent only for the root.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orbits: Option<String>,
    #[serde(default)]
    pub textures: TexturePaths,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<PointOfInterest>,
    /// Eligible for camera focus navigation.
    #[serde(default)]
    pub traversable: bool,
    /// Fixed phase offset in radians; random when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<f64>,
}

/// Named texture paths. `map` is mandatory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TexturePaths {
    #[serde(default)]
    pub map: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bump: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specular: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub atmosphere: Option<String>,
    #[serde(
        default,
        rename = "atmosphereAlpha",
        skip_serializing_if = "Option::is_none"
    )]
    pub atmosphere_alpha: Option<String>,
}

impl TexturePaths {
    pub fn new(map: impl Into<String>) -> Self {
        Self {
            map: map.into(),
            ..Self::default()
        }
    }

    /// Number of textures this set will request.
    pub fn count(&self) -> usize {
        usize::from(!self.map.is_empty())
            + [
                &self.bump,
                &self.specular,
                &self.atmosphere,
                &self.atmosphere_alpha,
            ]
            .iter()
            .filter(|t| t.is_some())
            .count()
    }
}

/// A point of interest on a body's surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    pub name: String,
    /// Rotation about Y, radians.
    pub y: f64,
    /// Rotation about Z, radians.
    pub z: f64,
    /// Icon name.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl BodyDescriptor {
    pub fn new(name: impl Into<String>, kind: BodyKind, radius: f64) -> Self {
        let name = name.into();
        Self {
            textures: TexturePaths::new(format!("textures/{}.jpg", name.to_lowercase())),
            name,
            radius,
            distance: 0.0,
            period: 0.0,
            daylength: 0.0,
            kind,
            tilt: 0.0,
            orbits: None,
            labels: Vec::new(),
            traversable: false,
            offset: None,
        }
    }

    // -- Builder pattern --

    pub fn orbiting(mut self, parent: impl Into<String>) -> Self {
        self.orbits = Some(parent.into());
        self
    }

    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = distance;
        self
    }

    pub fn with_period(mut self, period: f64) -> Self {
        self.period = period;
        self
    }

    pub fn with_daylength(mut self, daylength: f64) -> Self {
        self.daylength = daylength;
        self
    }

    pub fn with_tilt(mut self, tilt: f64) -> Self {
        self.tilt = tilt;
        self
    }

    pub fn with_textures(mut self, textures: TexturePaths) -> Self {
        self.textures = textures;
        self
    }

    pub fn with_label(mut self, poi: PointOfInterest) -> Self {
        self.labels.push(poi);
        self
    }

    pub fn with_offset(mut self, offset: f64) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn traversable(mut self) -> Self {
        self.traversable = true;
        self
    }
}

/// Ordered list of descriptors. Order is construction order: a parent must
/// appear before anything that orbits it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BodyCatalog {
    pub bodies: Vec<BodyDescriptor>,
}

impl BodyCatalog {
    /// Parse a catalog from a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Total number of textures the whole catalog will request.
    pub fn texture_count(&self) -> usize {
        self.bodies.iter().map(|b| b.textures.count()).sum()
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}

impl From<Vec<BodyDescriptor>> for BodyCatalog {
    fn from(bodies: Vec<BodyDescriptor>) -> Self {
        Self { bodies }
    }
}
