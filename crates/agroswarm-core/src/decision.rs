//! Action policy trait and idle implementation.
//!
//! On every action tick the runner asks an [`ActionPolicy`] what each agent
//! should do. The trait abstracts the mechanism by which decisions are
//! obtained: a rule table, a learning agent, a scripted scenario, or a
//! test stub. Policies see the simulator read-only; the runner applies the
//! decisions and reports the rewards back through
//! [`ActionPolicy::observe_reward`].

use agroswarm_types::ActionKind;

use crate::simulator::Simulator;

/// One agent's decision for an action tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentDecision {
    /// The action to apply on the cell the agent stands on after moving.
    pub action: ActionKind,
    /// Movement offset `(dx, dy)`, applied before the action.
    pub step: (isize, isize),
}

impl AgentDecision {
    /// Act in place.
    pub const fn stay(action: ActionKind) -> Self {
        Self {
            action,
            step: (0, 0),
        }
    }
}

/// A source of agent decisions.
pub trait ActionPolicy {
    /// Decide what agent `agent_index` does this action tick.
    fn decide(&mut self, agent_index: usize, sim: &Simulator) -> AgentDecision;

    /// Called after `decision` was applied and earned `reward`. `sim`
    /// reflects the state after the action.
    fn observe_reward(
        &mut self,
        _agent_index: usize,
        _decision: &AgentDecision,
        _reward: f64,
        _sim: &Simulator,
    ) {
    }
}

/// A policy that always idles in place.
///
/// Idle agents on a base recharge, so this also exercises docking.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdlePolicy;

impl ActionPolicy for IdlePolicy {
    fn decide(&mut self, _agent_index: usize, _sim: &Simulator) -> AgentDecision {
        AgentDecision::stay(ActionKind::Idle)
    }
}
