use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_physics_dt() -> f64 {
    1.0 / 60.0
}
const fn default_substeps() -> u32 {
    4
}
const fn default_gravity() -> [f32; 3] {
    [0.0, -9.81, 0.0]
}

// ---------------------------------------------------------------------------
// SimConfig
// ---------------------------------------------------------------------------

/// Main simulation configuration.
///
/// One simulation frame advances the physics pipeline by `physics_dt`
/// seconds, split into `substeps` equal pipeline steps.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Resource)]
pub struct SimConfig {
    /// Simulation timestep in seconds (default: 1/60).
    #[serde(default = "default_physics_dt")]
    pub physics_dt: f64,

    /// Physics pipeline substeps per simulation step (default: 4).
    #[serde(default = "default_substeps")]
    pub substeps: u32,

    /// Gravity vector [x, y, z] in m/s^2, y-up (default: [0, -9.81, 0]).
    #[serde(default = "default_gravity")]
    pub gravity: [f32; 3],

    /// World water plane height in metres. `None` disables buoyancy.
    #[serde(default)]
    pub water_level: Option<f32>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            physics_dt: default_physics_dt(),
            substeps: default_substeps(),
            gravity: default_gravity(),
            water_level: None,
        }
    }
}

impl SimConfig {
    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics_dt <= 0.0 {
            return Err(ConfigError::InvalidPhysicsDt(self.physics_dt));
        }
        if self.substeps == 0 {
            return Err(ConfigError::InvalidSubsteps(self.substeps));
        }
        if self.gravity.iter().any(|g| !g.is_finite()) {
            return Err(ConfigError::NonFiniteGravity);
        }
        Ok(())
    }

    /// Simulation timestep as `f32`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn dt(&self) -> f32 {
        self.physics_dt as f32
    }

    /// Pipeline timestep: `physics_dt` divided across substeps.
    pub fn substep_dt(&self) -> f64 {
        self.physics_dt / f64::from(self.substeps)
    }

    /// Simulation rate in Hz.
    pub fn physics_hz(&self) -> f64 {
        1.0 / self.physics_dt
    }

    /// Parse from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}
