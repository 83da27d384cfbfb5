//! Configuration loading and typed config structures for the Loam simulation.
//!
//! The canonical configuration lives in `loam-config.yaml` at the project
//! root. This module defines strongly-typed structs that mirror the YAML
//! structure, and provides a loader that reads and validates the file.

use std::path::Path;

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `loam-config.yaml`. All fields have defaults
/// tuned for a small observable world.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimConfig {
    /// World dimensions and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Movement resolution parameters.
    #[serde(default)]
    pub motion: MotionConfig,

    /// Water and nutrient diffusion parameters.
    #[serde(default)]
    pub diffusion: DiffusionConfig,

    /// Lifecycle countdowns and probabilities.
    #[serde(default)]
    pub lifecycle: LifecycleConfig,

    /// Plant growth parameters.
    #[serde(default)]
    pub growth: GrowthConfig,
}

impl SimConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yml::from_str(&contents)?)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }
}

/// World dimensions and seed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Grid width in cells.
    #[serde(default = "default_width")]
    pub width: u32,

    /// Grid height in cells.
    #[serde(default = "default_height")]
    pub height: u32,

    /// Random seed for reproducibility.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            seed: default_seed(),
        }
    }
}

/// Movement resolution parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MotionConfig {
    /// Cells scanned past a tunnelable host before a fall or slide is
    /// allowed anyway.
    #[serde(default = "default_gravity_lookahead")]
    pub gravity_lookahead: u32,

    /// Cells visited by the relocation scan before giving up and
    /// allowing the move anyway.
    #[serde(default = "default_relocation_lookahead")]
    pub relocation_lookahead: u32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            gravity_lookahead: default_gravity_lookahead(),
            relocation_lookahead: default_relocation_lookahead(),
        }
    }
}

/// Water and nutrient diffusion parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DiffusionConfig {
    /// Upper bound on a single water transfer; the actual amount is
    /// rolled uniformly in `0..=max`.
    #[serde(default = "default_water_transfer_max")]
    pub water_transfer_max: u32,

    /// Water credited to the surface per rain tick, per column.
    #[serde(default = "default_rain_water")]
    pub rain_water: u32,
}

impl Default for DiffusionConfig {
    fn default() -> Self {
        Self {
            water_transfer_max: default_water_transfer_max(),
            rain_water: default_rain_water(),
        }
    }
}

/// Lifecycle countdowns and probabilities.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LifecycleConfig {
    /// Ticks of airborne life before steam condenses into water.
    #[serde(default = "default_condensation_countdown")]
    pub condensation_countdown: u32,

    /// Per-tick chance a saturated soil cell sprouts grass.
    #[serde(default = "default_grass_growth_chance")]
    pub grass_growth_chance: f64,

    /// Per-tick chance buried grass dies off to compost.
    #[serde(default = "default_grass_death_chance")]
    pub grass_death_chance: f64,

    /// Per-tick chance grass stacks a second cell on top of itself.
    #[serde(default = "default_grass_stack_chance")]
    pub grass_stack_chance: f64,

    /// Per-unit-of-water chance grass transpires a steam particle.
    #[serde(default = "default_transpiration_chance")]
    pub transpiration_chance: f64,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            condensation_countdown: default_condensation_countdown(),
            grass_growth_chance: default_grass_growth_chance(),
            grass_death_chance: default_grass_death_chance(),
            grass_stack_chance: default_grass_stack_chance(),
            transpiration_chance: default_transpiration_chance(),
        }
    }
}

/// Plant growth parameters.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GrowthConfig {
    /// Nutrients one growth step costs the growing cell.
    #[serde(default = "default_activation_level")]
    pub activation_level: u32,

    /// Whether growth conserves resources: a child starts with a share
    /// of its parent's stores, debited from the parent.
    #[serde(default = "default_closed_economy")]
    pub closed_economy: bool,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            activation_level: default_activation_level(),
            closed_economy: default_closed_economy(),
        }
    }
}

const fn default_width() -> u32 {
    80
}

const fn default_height() -> u32 {
    60
}

const fn default_seed() -> u64 {
    42
}

const fn default_gravity_lookahead() -> u32 {
    10
}

const fn default_relocation_lookahead() -> u32 {
    100
}

const fn default_water_transfer_max() -> u32 {
    10
}

const fn default_rain_water() -> u32 {
    5
}

const fn default_condensation_countdown() -> u32 {
    600
}

const fn default_grass_growth_chance() -> f64 {
    0.001
}

const fn default_grass_death_chance() -> f64 {
    0.005
}

const fn default_grass_stack_chance() -> f64 {
    0.2
}

const fn default_transpiration_chance() -> f64 {
    0.000_01
}

const fn default_activation_level() -> u32 {
    20
}

const fn default_closed_economy() -> bool {
    true
}
