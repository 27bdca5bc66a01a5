use crate::{constants, error::ConfigError};

use serde::{Deserialize, Serialize};

/// Tunable parameters of a [`Spacetime`](crate::spacetime::Spacetime).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacetimeConfig {
    /// Gravitational constant used for every force and orbit calculation.
    pub gravitational_constant: f64,
    /// Bodies with mass below this value only react to gravity, they don't generate it.
    pub react_only_threshold: f64,
    /// Relative speed at or below which collisions bounce instead of merging.
    pub elastic_collision_threshold: f64,
    /// Relative speed at or below which two ships may dock.
    pub docking_threshold: f64,
    /// Relative speed at or below which a ship may land on a body.
    pub landing_threshold: f64,
    /// Force samples weaker than this are not recorded for the focus body.
    pub force_display_threshold: f64,
    /// Makes all bodies larger.
    pub density_scaling: f64,
    /// Collisions are resolved once every this many ticks.
    pub collision_interval: u32,
    /// Wall-clock cadence of the external driver.
    pub ticks_per_second: u32,
    /// Seconds of wall-clock time over which a time-scale change is ramped.
    pub time_scale_transition: f64,
    /// Simulated seconds per tick before any time-scale change.
    pub initial_seconds_per_tick: f64,
}

impl Default for SpacetimeConfig {
    fn default() -> Self {
        Self {
            gravitational_constant: constants::G,
            react_only_threshold: Self::DEFAULT_REACT_ONLY_THRESHOLD,
            elastic_collision_threshold: Self::DEFAULT_ELASTIC_COLLISION_THRESHOLD,
            docking_threshold: Self::DEFAULT_DOCKING_THRESHOLD,
            landing_threshold: Self::DEFAULT_LANDING_THRESHOLD,
            force_display_threshold: Self::DEFAULT_FORCE_DISPLAY_THRESHOLD,
            density_scaling: 1.0,
            collision_interval: Self::DEFAULT_COLLISION_INTERVAL,
            ticks_per_second: Self::DEFAULT_TICKS_PER_SECOND,
            time_scale_transition: Self::DEFAULT_TIME_SCALE_TRANSITION,
            initial_seconds_per_tick: 1.0 / Self::DEFAULT_TICKS_PER_SECOND as f64,
        }
    }
}

impl SpacetimeConfig {
    pub const DEFAULT_REACT_ONLY_THRESHOLD: f64 = 1.0e21;
    pub const DEFAULT_ELASTIC_COLLISION_THRESHOLD: f64 = 10.0;
    pub const DEFAULT_DOCKING_THRESHOLD: f64 = 1.0;
    pub const DEFAULT_LANDING_THRESHOLD: f64 = 5.0;
    pub const DEFAULT_FORCE_DISPLAY_THRESHOLD: f64 = 0.000001;
    pub const DEFAULT_COLLISION_INTERVAL: u32 = 4;
    pub const DEFAULT_TICKS_PER_SECOND: u32 = 60;
    pub const DEFAULT_TIME_SCALE_TRANSITION: f64 = 0.5;

    /// Parses a JSON document. Missing fields take their default value.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every parameter is finite and in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("react_only_threshold", self.react_only_threshold),
            ("elastic_collision_threshold", self.elastic_collision_threshold),
            ("docking_threshold", self.docking_threshold),
            ("landing_threshold", self.landing_threshold),
            ("force_display_threshold", self.force_display_threshold),
            ("time_scale_transition", self.time_scale_transition),
            ("initial_seconds_per_tick", self.initial_seconds_per_tick),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }

        let positive = [
            ("gravitational_constant", self.gravitational_constant),
            ("density_scaling", self.density_scaling),
            ("collision_interval", self.collision_interval as f64),
            ("ticks_per_second", self.ticks_per_second as f64),
        ];
        for (name, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }

        Ok(())
    }

    /// Number of ticks a time-scale change is spread over. Always at least one.
    pub fn time_scale_ramp_ticks(&self) -> u32 {
        ((self.time_scale_transition * self.ticks_per_second as f64).round() as u32).max(1)
    }
}
