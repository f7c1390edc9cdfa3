//! Per-action operating costs.
//!
//! Every action pays its cost, scaled by the reward config's
//! `action_cost_scale`, regardless of whether it achieved anything.

use agroswarm_types::ActionKind;
use serde::Deserialize;

/// Operating cost of each action, in reward units.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ActionCosts {
    /// Idle (default: 0).
    pub idle: f64,
    /// Monitor (default: 0.001).
    pub monitor: f64,
    /// Irrigate (default: 0.01).
    pub irrigate: f64,
    /// Apply pesticide (default: 0.012).
    pub apply_pesticide: f64,
    /// Apply fungicide (default: 0.012).
    pub apply_fungicide: f64,
    /// Fertilize (default: 0.009).
    pub fertilize: f64,
    /// Harvest, charged on success and failure alike (default: 0.003).
    pub harvest: f64,
}

impl Default for ActionCosts {
    fn default() -> Self {
        Self {
            idle: 0.0,
            monitor: 0.001,
            irrigate: 0.01,
            apply_pesticide: 0.012,
            apply_fungicide: 0.012,
            fertilize: 0.009,
            harvest: 0.003,
        }
    }
}

impl ActionCosts {
    /// The unscaled cost of `action`.
    pub const fn cost(&self, action: ActionKind) -> f64 {
        match action {
            ActionKind::Idle => self.idle,
            ActionKind::Monitor => self.monitor,
            ActionKind::Irrigate => self.irrigate,
            ActionKind::ApplyPesticide => self.apply_pesticide,
            ActionKind::ApplyFungicide => self.apply_fungicide,
            ActionKind::Fertilize => self.fertilize,
            ActionKind::Harvest => self.harvest,
        }
    }
}
