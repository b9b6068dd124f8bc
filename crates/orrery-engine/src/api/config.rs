use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use crate::error::BuildError;

/// Tunable constants for one simulation run.
///
/// The distance curve and the time scale are display choices, not physics:
/// they can be overridden from JSON without touching the body catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Simulated hours that pass per real second at speed 1.0.
    pub simulated_hours_per_second: f64,
    /// Normalised radius = sqrt(km) / radius_divisor.
    pub radius_divisor: f64,
    /// Exponent of the orbital distance compression curve (non-moons).
    pub distance_exponent: f64,
    /// Multiplier applied after the compression curve (non-moons).
    pub distance_scale: f64,
    /// Gap between a body surface and its atmosphere shell.
    pub atmosphere_offset: f64,
    /// Seed for default phase offsets.
    pub seed: u64,
    /// Speed multiplier bounds.
    pub speed: SpeedConfig,
    /// Label fade thresholds.
    pub labels: LabelThresholds,
    /// Body focused at start (defaults to the root body).
    pub initial_focus: Option<String>,
}

/// Bounds and starting value of the user-controlled speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedConfig {
    pub initial: f64,
    pub min: f64,
    pub max: f64,
}

/// Angular and distance thresholds for label fading.
/// Distances are multiples of the owning body's normalised radius.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelThresholds {
    /// Angle (radians) beyond which a label is hidden.
    pub hide_angle: f64,
    /// Angle (radians) beyond which a label starts fading.
    pub fade_angle: f64,
    pub hide_radii: f64,
    pub fade_radii: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            simulated_hours_per_second: 8.0,
            radius_divisor: 500.0,
            distance_exponent: 0.4,
            distance_scale: 1.0,
            atmosphere_offset: 0.0005,
            seed: 0x5eed_0f_0bb1,
            speed: SpeedConfig::default(),
            labels: LabelThresholds::default(),
            initial_focus: None,
        }
    }
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            initial: 0.125,
            min: 0.1,
            max: 20.0,
        }
    }
}

impl Default for LabelThresholds {
    fn default() -> Self {
        Self {
            hide_angle: 1.0,
            fade_angle: 0.75,
            hide_radii: 12.0,
            fade_radii: 8.0,
        }
    }
}

impl SpeedConfig {
    /// The range must be non-empty and strictly positive, so time never runs
    /// backwards or stops through the speed control.
    pub fn validate(&self) -> Result<(), BuildError> {
        let positive = self.min > 0.0 && self.max.is_finite();
        if !positive || self.min > self.max {
            return Err(BuildError::InvalidSpeedRange {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }
}

impl SimulationConfig {
    /// Parse a config from a JSON string. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, BuildError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would break the simulation's invariants.
    pub fn validate(&self) -> Result<(), BuildError> {
        self.speed.validate()
    }

    /// Angular rate applied to elapsed seconds: 2π per simulated hour.
    pub fn time_factor(&self) -> f64 {
        TAU * self.simulated_hours_per_second
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_time_factor_is_eight_hours_per_second() {
        let config = SimulationConfig::default();
        assert!((config.time_factor() - 16.0 * std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SimulationConfig::from_json(
            r#"{ "distance_exponent": 0.5, "speed": { "max": 5.0 } }"#,
        )
        .unwrap();
        assert_eq!(config.distance_exponent, 0.5);
        assert_eq!(config.speed.max, 5.0);
        assert_eq!(config.speed.min, 0.1);
        assert_eq!(config.radius_divisor, 500.0);
        assert_eq!(config.labels, LabelThresholds::default());
    }

    #[test]
    fn rejects_non_positive_speed_range() {
        let err = SimulationConfig::from_json(
            r#"{ "speed": { "initial": -2.0, "min": -5.0, "max": 20.0 } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            BuildError::InvalidSpeedRange { min, max } if min == -5.0 && max == 20.0
        ));

        let zero = SpeedConfig {
            min: 0.0,
            ..SpeedConfig::default()
        };
        assert!(zero.validate().is_err());
    }

    #[test]
    fn rejects_inverted_speed_range() {
        let err = SimulationConfig::from_json(r#"{ "speed": { "min": 5.0, "max": 1.0 } }"#)
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidSpeedRange { .. }));
        assert!(SpeedConfig::default().validate().is_ok());
    }
}
