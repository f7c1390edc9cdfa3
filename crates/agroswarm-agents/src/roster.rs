//! Agent spawning, movement, and docking.
//!
//! The roster is fixed at construction: agents are never added or removed.
//! Positions are always clamped to the field, so an agent can never stand
//! off-grid.

use agroswarm_types::{ActionKind, AgentState, Position};
use rand::Rng;
use tracing::debug;

use crate::config::AgentConfig;

/// Offset `base` by `delta` and clamp into `[0, extent)`.
fn clamp_axis(base: usize, delta: isize, extent: usize) -> usize {
    base.saturating_add_signed(delta)
        .min(extent.saturating_sub(1))
}

/// Offset `position` by `(dx, dy)`, clamped to a `width x height` field.
pub fn clamp_step(position: Position, dx: isize, dy: isize, width: usize, height: usize) -> Position {
    Position::new(
        clamp_axis(position.x, dx, width),
        clamp_axis(position.y, dy, height),
    )
}

/// Offset `base` by a uniform draw from `[-jitter, jitter]`, clamped into
/// `[0, extent)`.
fn jittered_axis(base: usize, jitter: usize, extent: usize, rng: &mut impl Rng) -> usize {
    let offset = rng.random_range(0..=jitter.saturating_mul(2));
    base.saturating_add(offset)
        .saturating_sub(jitter)
        .min(extent.saturating_sub(1))
}

/// Build the roster: agent `i` spawns at base `i % bases.len()` plus a
/// uniform jitter on each axis, clamped to the field.
pub fn spawn_agents(
    config: &AgentConfig,
    bases: &[Position],
    width: usize,
    height: usize,
    rng: &mut impl Rng,
) -> Vec<AgentState> {
    let jitter = config.spawn_jitter;
    (0..config.count)
        .map(|i| {
            let base = i
                .checked_rem(bases.len())
                .and_then(|slot| bases.get(slot))
                .copied()
                .unwrap_or_default();
            let position = Position::new(
                jittered_axis(base.x, jitter, width, rng),
                jittered_axis(base.y, jitter, height, rng),
            );
            debug!(agent = i, x = position.x, y = position.y, "Agent spawned");
            AgentState::new(position, config.max_battery)
        })
        .collect()
}

/// Move `agent` by `(dx, dy)`, clamped to the field.
///
/// Drains `drain_per_move` battery (floored at 0) only if the position
/// actually changed. Returns whether it did.
pub fn move_agent(
    agent: &mut AgentState,
    dx: isize,
    dy: isize,
    width: usize,
    height: usize,
    config: &AgentConfig,
) -> bool {
    let target = clamp_step(agent.position, dx, dy, width, height);
    if target == agent.position {
        return false;
    }
    agent.position = target;
    agent.battery = (agent.battery - config.drain_per_move).max(0.0);
    true
}

/// Whether `agent` stands on one of `bases`.
pub fn is_docked(agent: &AgentState, bases: &[Position]) -> bool {
    bases.contains(&agent.position)
}

/// Recharge `agent` if it is docked and its last action was idle.
///
/// Returns whether any charge was added.
pub fn recharge_if_docked(agent: &mut AgentState, bases: &[Position], config: &AgentConfig) -> bool {
    if agent.last_action != ActionKind::Idle || !is_docked(agent, bases) {
        return false;
    }
    agent.battery = (agent.battery + config.recharge_per_tick).min(config.max_battery);
    true
}
