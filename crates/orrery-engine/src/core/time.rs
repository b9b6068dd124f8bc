use crate::api::config::SpeedConfig;

/// Simulation clock.
/// Accumulates real frame time scaled by a user-controlled speed multiplier.
/// Pausing freezes the accumulator without resetting it.
#[derive(Debug, Clone)]
pub struct SimulationClock {
    /// Scaled seconds since the run started.
    elapsed: f64,
    speed: f64,
    min_speed: f64,
    max_speed: f64,
    paused: bool,
}

impl SimulationClock {
    pub fn new(speed: SpeedConfig) -> Self {
        let mut clock = Self {
            elapsed: 0.0,
            speed: speed.initial,
            min_speed: speed.min,
            max_speed: speed.max,
            paused: false,
        };
        clock.set_speed(speed.initial);
        clock
    }

    /// Add one frame of real time. Returns the new elapsed simulation seconds.
    pub fn advance(&mut self, real_dt: f64) -> f64 {
        if !self.paused && real_dt > 0.0 {
            self.elapsed += real_dt * self.speed;
        }
        self.elapsed
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn speed(&self) -> f64 {
        self.speed
    }

    /// Set the speed multiplier, clamped to the configured range.
    pub fn set_speed(&mut self, speed: f64) {
        self.speed = speed.max(self.min_speed).min(self.max_speed);
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }
}

impl Default for SimulationClock {
    fn default() -> Self {
        Self::new(SpeedConfig::default())
    }
}
