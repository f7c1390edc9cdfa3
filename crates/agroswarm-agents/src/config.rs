//! Tunables for agent spawning, action effects, and rewards.
//!
//! These correspond to the `agents`, `actions`, and `rewards` sections of
//! `agroswarm-config.yaml`. Every struct defaults field-by-field, so a
//! partial YAML section only overrides what it names.

use agroswarm_types::Position;
use serde::Deserialize;

/// Roster size, base stations, and battery mechanics.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Number of agents to spawn (default: 6).
    pub count: usize,

    /// Base stations. `None` means the two opposite corners one cell in
    /// from the edge.
    pub base_locations: Option<Vec<Position>>,

    /// Maximum spawn offset from the base along each axis (default: 1).
    pub spawn_jitter: usize,

    /// Battery cap and starting charge (default: 1.0).
    pub max_battery: f64,

    /// Battery spent per move that changes position (default: 0.0015).
    pub drain_per_move: f64,

    /// Battery regained per idle turn at a base (default: 0.002).
    pub recharge_per_tick: f64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            count: 6,
            base_locations: None,
            spawn_jitter: 1,
            max_battery: 1.0,
            drain_per_move: 0.0015,
            recharge_per_tick: 0.002,
        }
    }
}

impl AgentConfig {
    /// The base stations for a `width x height` field.
    pub fn bases_for(&self, width: usize, height: usize) -> Vec<Position> {
        self.base_locations
            .clone()
            .unwrap_or_else(|| default_base_locations(width, height))
    }
}

/// `(1, 1)` and `(width - 2, height - 2)`, saturating on tiny fields.
pub fn default_base_locations(width: usize, height: usize) -> Vec<Position> {
    vec![
        Position::new(1, 1),
        Position::new(width.saturating_sub(2), height.saturating_sub(2)),
    ]
}

/// Magnitudes and gates of the action effects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Moisture added by one irrigation (default: 0.35).
    pub irrigate_amount: f64,

    /// Fraction of the current pest or disease level one treatment
    /// removes (default: 0.4).
    pub treatment_fraction: f64,

    /// Nutrient added by one fertilization (default: 0.25).
    pub fertilize_amount: f64,

    /// Growth must exceed this for a harvest to succeed (default: 0.8).
    pub harvest_growth_threshold: f64,

    /// Health must exceed this for a harvest to succeed (default: 0.5).
    pub harvest_health_threshold: f64,

    /// Chance a harvested cell is immediately replanted (default: 0.7).
    pub replant_chance: f64,

    /// Pest and disease are multiplied by this on harvest (default: 0.3).
    pub disturbance_factor: f64,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            irrigate_amount: 0.35,
            treatment_fraction: 0.4,
            fertilize_amount: 0.25,
            harvest_growth_threshold: 0.8,
            harvest_health_threshold: 0.5,
            replant_chance: 0.7,
            disturbance_factor: 0.3,
        }
    }
}

/// Base rewards, before shaping multipliers and action costs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Reward per irrigation (default: 0.05).
    pub irrigate: f64,
    /// Reward per unit of pest or disease actually removed (default: 0.08).
    pub treatment: f64,
    /// Reward per fertilization (default: 0.05).
    pub fertilize: f64,
    /// Reward per monitoring pass (default: 0.01).
    pub monitor: f64,
    /// Penalty for an ineligible harvest (default: 0.02).
    pub harvest_failure_penalty: f64,
    /// Reward per unit of yield (default: 2.0).
    pub yield_weight: f64,
    /// Global multiplier on the per-action cost table (default: 1.0).
    pub action_cost_scale: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            irrigate: 0.05,
            treatment: 0.08,
            fertilize: 0.05,
            monitor: 0.01,
            harvest_failure_penalty: 0.02,
            yield_weight: 2.0,
            action_cost_scale: 1.0,
        }
    }
}
