use std::collections::HashMap;

use crate::bodies::celestial::CelestialBody;
use crate::error::LookupError;

/// Name-keyed body storage that remembers insertion order.
/// Iteration follows catalog order, so runs and tests are deterministic.
#[derive(Debug, Clone, Default)]
pub struct BodyRegistry {
    bodies: Vec<CelestialBody>,
    index: HashMap<String, usize>,
}

impl BodyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a body. Returns the body back if its name is already taken.
    pub fn insert(&mut self, body: CelestialBody) -> Result<(), CelestialBody> {
        if self.index.contains_key(body.name()) {
            return Err(body);
        }
        self.index.insert(body.name().to_string(), self.bodies.len());
        self.bodies.push(body);
        Ok(())
    }

    /// Look up a body by name. Fails instead of returning a silent default.
    pub fn get(&self, name: &str) -> Result<&CelestialBody, LookupError> {
        self.index
            .get(name)
            .map(|&i| &self.bodies[i])
            .ok_or_else(|| LookupError::UnknownBody(name.to_string()))
    }

    pub fn get_mut(&mut self, name: &str) -> Result<&mut CelestialBody, LookupError> {
        match self.index.get(name) {
            Some(&i) => Ok(&mut self.bodies[i]),
            None => Err(LookupError::UnknownBody(name.to_string())),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CelestialBody> {
        self.bodies.iter()
    }

    /// The body without a parent.
    pub fn root(&self) -> Option<&CelestialBody> {
        self.bodies.iter().find(|b| b.orbits().is_none())
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }
}
