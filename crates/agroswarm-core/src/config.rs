//! Configuration loading and typed config structures for AgroSwarm.
//!
//! The canonical configuration lives in `agroswarm-config.yaml` at the
//! project root. Each section maps onto a typed struct; sections owned by a
//! lower crate (weather, spread, actions, ...) reuse that crate's parameter
//! type directly. Every field has a default, so an empty file is a valid
//! configuration.

use std::path::Path;

use agroswarm_agents::{ActionConfig, ActionCosts, AgentConfig, RewardConfig, ShapingTable};
use agroswarm_types::FieldCondition;
use agroswarm_world::{GrowthParams, PlantingParams, SpreadParams, WeatherParams};
use serde::Deserialize;
use tracing::warn;

use crate::sustainability::SustainabilityConfig;

/// Environment variable that overrides `world.seed` in [`SimulationConfig::from_file`].
pub const SEED_ENV_VAR: &str = "AGROSWARM_SEED";

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
/// Mirrors the structure of `agroswarm-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// Field dimensions and seed.
    #[serde(default)]
    pub world: WorldConfig,

    /// Day length.
    #[serde(default)]
    pub time: TimeConfig,

    /// Daily weather draw.
    #[serde(default)]
    pub weather: WeatherParams,

    /// Initial crop, pest, and disease seeding.
    #[serde(default)]
    pub planting: PlantingParams,

    /// Soil decay and crop growth.
    #[serde(default)]
    pub growth: GrowthParams,

    /// Pest and disease diffusion.
    #[serde(default)]
    pub spread: SpreadParams,

    /// Roster, bases, and battery.
    #[serde(default)]
    pub agents: AgentConfig,

    /// Action effect magnitudes and harvest gates.
    #[serde(default)]
    pub actions: ActionConfig,

    /// Per-action operating costs.
    #[serde(default)]
    pub costs: ActionCosts,

    /// Base rewards.
    #[serde(default)]
    pub rewards: RewardConfig,

    /// Initial reward-shaping multipliers.
    #[serde(default)]
    pub shaping: ShapingTable,

    /// Sustainability index weights.
    #[serde(default)]
    pub sustainability: SustainabilityConfig,

    /// Episode runner settings.
    #[serde(default)]
    pub runner: RunnerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `AGROSWARM_SEED`, if set to an integer, overrides `world.seed`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Apply environment-variable overrides.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(SEED_ENV_VAR) {
            match val.trim().parse::<u64>() {
                Ok(seed) => self.world.seed = seed,
                Err(_) => warn!(value = %val, "Ignoring non-numeric {SEED_ENV_VAR}"),
            }
        }
    }
}

/// Field dimensions and random seed.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WorldConfig {
    /// Field width in cells.
    #[serde(default = "default_width")]
    pub width: usize,

    /// Field height in cells.
    #[serde(default = "default_height")]
    pub height: usize,

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

/// Day length.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeConfig {
    /// Ticks in one simulated day. Weather resamples once per day.
    #[serde(default = "default_ticks_per_day")]
    pub ticks_per_day: u64,
}

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            ticks_per_day: default_ticks_per_day(),
        }
    }
}

/// Which built-in policy the engine binary drives the agents with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicyKind {
    /// Every agent idles.
    Idle,
    /// Threshold rules on the agent's own cell.
    #[default]
    Scout,
    /// Tabular softmax preferences learned from rewards.
    Preference,
}

/// Episode runner settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RunnerConfig {
    /// Stop after this many ticks (0 = unlimited).
    #[serde(default)]
    pub max_ticks: u64,

    /// Agents act on ticks that are multiples of this (default: 8).
    #[serde(default = "default_action_every")]
    pub action_every: u64,

    /// Field conditions active from the start.
    #[serde(default)]
    pub conditions: Vec<FieldCondition>,

    /// Policy used by the engine binary.
    #[serde(default)]
    pub policy: PolicyKind,

    /// Free-text field report handed to the shaping advisor at start-up.
    #[serde(default)]
    pub advisory_report: Option<String>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_ticks: 0,
            action_every: default_action_every(),
            conditions: Vec::new(),
            policy: PolicyKind::default(),
            advisory_report: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error), used when `RUST_LOG`
    /// is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit newline-delimited JSON instead of human-readable lines.
    #[serde(default)]
    pub json: bool,

    /// Emit a summary line every N days (0 = never).
    #[serde(default = "default_summary_every_days")]
    pub summary_every_days: u64,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
            summary_every_days: default_summary_every_days(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

const fn default_width() -> usize {
    32
}

const fn default_height() -> usize {
    20
}

const fn default_seed() -> u64 {
    42
}

const fn default_ticks_per_day() -> u64 {
    120
}

const fn default_action_every() -> u64 {
    8
}

fn default_log_level() -> String {
    "info".to_owned()
}

const fn default_summary_every_days() -> u64 {
    1
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use agroswarm_types::{Position, ShapingCategory};

    use super::*;

    #[test]
    fn default_config_matches_field_defaults() {
        let config = SimulationConfig::default();
        assert_eq!(config.world.width, 32);
        assert_eq!(config.world.height, 20);
        assert_eq!(config.world.seed, 42);
        assert_eq!(config.time.ticks_per_day, 120);
        assert_eq!(config.agents.count, 6);
        assert_eq!(config.runner.action_every, 8);
        assert_eq!(config.runner.policy, PolicyKind::Scout);
        assert!((config.planting.crop_density - 0.85).abs() < f64::EPSILON);
        assert!((config.costs.apply_pesticide - 0.012).abs() < f64::EPSILON);
    }

    #[test]
    fn parse_full_yaml() {
        let yaml = r"
world:
  width: 16
  height: 10
  seed: 7

time:
  ticks_per_day: 60

weather:
  rain_chance: 0.3

planting:
  crop_density: 0.5

growth:
  moisture_decay: 0.01

spread:
  pest_spread_rate: 0.005
  wind_variance: 0.2

agents:
  count: 4
  base_locations:
    - { x: 0, y: 0 }
    - { x: 15, y: 9 }

actions:
  replant_chance: 0.5

costs:
  harvest: 0.004

rewards:
  yield_weight: 3.0

shaping:
  irrigate_multiplier: 1.2
  pesticide_multiplier: 1.35

sustainability:
  biodiversity_weight: 0.4

runner:
  max_ticks: 500
  action_every: 4
  conditions: [rainy, wind_storm]
  policy: preference
  advisory_report: aphids rising in the north

logging:
  level: debug
  json: true
  summary_every_days: 2
";

        let config = SimulationConfig::parse(yaml).unwrap();

        assert_eq!(config.world.width, 16);
        assert_eq!(config.world.seed, 7);
        assert_eq!(config.time.ticks_per_day, 60);
        assert!((config.weather.rain_chance - 0.3).abs() < f64::EPSILON);
        assert!((config.weather.temp_mean - 29.0).abs() < f64::EPSILON);
        assert!((config.planting.crop_density - 0.5).abs() < f64::EPSILON);
        assert!((config.spread.disease_spread_rate - 0.0018).abs() < f64::EPSILON);
        assert_eq!(config.agents.count, 4);
        assert_eq!(
            config.agents.base_locations,
            Some(vec![Position::new(0, 0), Position::new(15, 9)])
        );
        assert!((config.costs.harvest - 0.004).abs() < f64::EPSILON);
        assert!((config.rewards.yield_weight - 3.0).abs() < f64::EPSILON);
        assert!((config.shaping.get(ShapingCategory::Pesticide) - 1.35).abs() < f64::EPSILON);
        assert!((config.shaping.get(ShapingCategory::Monitor) - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.runner.max_ticks, 500);
        assert_eq!(
            config.runner.conditions,
            vec![FieldCondition::Rainy, FieldCondition::WindStorm]
        );
        assert_eq!(config.runner.policy, PolicyKind::Preference);
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.json);
        assert_eq!(config.logging.summary_every_days, 2);
    }

    #[test]
    fn parse_minimal_yaml() {
        let config = SimulationConfig::parse("world:\n  seed: 9\n").unwrap();
        assert_eq!(config.world.seed, 9);
        assert_eq!(config.world.width, 32);
        assert_eq!(config.time.ticks_per_day, 120);
    }

    #[test]
    fn parse_empty_yaml() {
        assert!(SimulationConfig::parse("").is_ok());
    }

    #[test]
    fn unknown_policy_is_rejected() {
        let err = SimulationConfig::parse("runner:\n  policy: genetic\n").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml { .. }));
    }

    #[test]
    fn load_project_config_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("agroswarm-config.yaml");
        if path.exists() {
            let config = SimulationConfig::from_file(&path);
            assert!(config.is_ok(), "Failed to load project config: {config:?}");
        }
    }
}
