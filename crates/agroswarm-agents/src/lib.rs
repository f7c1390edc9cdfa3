//! Field agents, their actions, and reward shaping for AgroSwarm.
//!
//! This crate holds the logic that operates on agent state and on the cell
//! an agent stands on. It sits between `agroswarm-world` (the field) and
//! `agroswarm-core` (orchestration), and performs no I/O.
//!
//! # Modules
//!
//! - [`actions`] -- Action handlers, outcomes, and the cost table.
//! - [`config`] -- Spawn, battery, effect, and reward tunables.
//! - [`error`] -- Error types for agent operations ([`AgentError`]).
//! - [`roster`] -- Spawning, clamped movement, and base recharging.
//! - [`shaping`] -- The shared reward-shaping table and the advisory
//!   interface that feeds it.

pub mod actions;
pub mod config;
pub mod error;
pub mod roster;
pub mod shaping;

// Re-export primary types at crate root for convenience.
pub use actions::costs::ActionCosts;
pub use actions::handlers::{ActionContext, ActionEffect, ActionOutcome, execute, harvest_ready};
pub use config::{ActionConfig, AgentConfig, RewardConfig, default_base_locations};
pub use error::AgentError;
pub use roster::{clamp_step, is_docked, move_agent, recharge_if_docked, spawn_agents};
pub use shaping::{
    Advisory, NEUTRAL_MULTIPLIER, NO_ALERTS_SUMMARY, NeutralAdvisor, ShapingAdvisor,
    ShapingHandle, ShapingTable, apply_advisory,
};
