//! Episode runner.
//!
//! This module provides [`run_episode`], the top-level loop that drives
//! the simulator with:
//!
//! - **Condition overrides**: active field conditions are re-applied to
//!   weather and shaping before every tick
//! - **Action cadence**: agents decide, move, and act every
//!   `action_every` ticks
//! - **Bounded runs**: stop after `max_ticks`, or when the callback breaks
//!
//! The runner wraps [`Simulator::step`] and adds the agent loop around it.

use std::ops::ControlFlow;

use agroswarm_types::FarmSnapshot;
use tracing::{debug, info};

use crate::conditions::ConditionOverrides;
use crate::config::RunnerConfig;
use crate::decision::ActionPolicy;
use crate::simulator::{SimError, Simulator, TickSummary};

/// Errors that can occur during an episode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RunnerError {
    /// A simulator call failed.
    #[error("simulation error: {source}")]
    Sim {
        /// The underlying simulator error.
        #[from]
        source: SimError,
    },
}

/// Why an episode ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// `max_ticks` ticks were executed.
    MaxTicksReached,
    /// The tick callback returned [`ControlFlow::Break`].
    CallbackStop,
}

/// Result of an episode.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    /// Ticks executed by this call.
    pub ticks_run: u64,
    /// Sum of every reward earned during the episode.
    pub total_reward: f64,
    /// The reason the episode ended.
    pub end_reason: EndReason,
    /// Farm state after the last tick, including the active field
    /// conditions.
    pub snapshot: FarmSnapshot,
}

/// Callback invoked after each tick completes.
///
/// Implementations can log, record, or stop the run by returning
/// [`ControlFlow::Break`].
pub trait TickCallback {
    /// Called after a tick completes successfully.
    fn on_tick(&mut self, summary: &TickSummary, sim: &Simulator) -> ControlFlow<()>;
}

/// A no-op tick callback for testing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpCallback;

impl TickCallback for NoOpCallback {
    fn on_tick(&mut self, _summary: &TickSummary, _sim: &Simulator) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// Whether agents act before the tick following `tick`.
fn is_action_tick(tick: u64, action_every: u64) -> bool {
    tick.checked_rem(action_every) == Some(0)
}

/// Let every agent decide, move, and act once. Returns the summed reward.
///
/// # Errors
///
/// Returns [`SimError`] if an agent index is invalid.
pub fn run_agents(sim: &mut Simulator, policy: &mut dyn ActionPolicy) -> Result<f64, SimError> {
    let mut total = 0.0;
    for index in 0..sim.agents().len() {
        let decision = policy.decide(index, sim);
        let (dx, dy) = decision.step;
        sim.move_agent(index, dx, dy)?;
        let reward = sim.apply_action(index, decision.action)?;
        sim.recharge_agent(index)?;
        policy.observe_reward(index, &decision, reward, sim);
        total += reward;
    }
    Ok(total)
}

/// Run the simulator until a termination condition is met.
///
/// Each iteration applies `overrides` (if any), runs the agents on action
/// ticks, advances one tick, and notifies `callback`. With `max_ticks` at
/// 0 the episode runs until the callback breaks.
///
/// # Errors
///
/// Returns [`RunnerError`] if a simulator call fails.
pub fn run_episode(
    sim: &mut Simulator,
    policy: &mut dyn ActionPolicy,
    mut overrides: Option<&mut ConditionOverrides>,
    config: &RunnerConfig,
    callback: &mut dyn TickCallback,
) -> Result<RunSummary, RunnerError> {
    let shaping = sim.shaping().clone();
    let mut ticks_run: u64 = 0;
    let mut total_reward = 0.0;

    info!(
        max_ticks = config.max_ticks,
        action_every = config.action_every,
        agents = sim.agents().len(),
        "Episode starting"
    );

    let end_reason = loop {
        if config.max_ticks > 0 && ticks_run >= config.max_ticks {
            info!(ticks_run, max_ticks = config.max_ticks, "Tick limit reached");
            break EndReason::MaxTicksReached;
        }

        if let Some(overrides) = overrides.as_deref_mut() {
            overrides.apply(sim.weather_mut(), &shaping);
        }

        if is_action_tick(sim.tick(), config.action_every) {
            let reward = run_agents(sim, policy)?;
            total_reward += reward;
            debug!(tick = sim.tick(), reward, "Agents acted");
        }

        let summary = sim.step()?;
        ticks_run = ticks_run.saturating_add(1);

        if callback.on_tick(&summary, sim).is_break() {
            info!(tick = summary.tick, "Callback requested stop");
            break EndReason::CallbackStop;
        }
    };

    let mut snapshot = sim.snapshot();
    if let Some(overrides) = overrides {
        snapshot.conditions = overrides.active().collect();
    }

    Ok(RunSummary {
        ticks_run,
        total_reward,
        end_reason,
        snapshot,
    })
}

/// Log the end of an episode.
pub fn log_run_end(summary: &RunSummary) {
    info!(
        reason = ?summary.end_reason,
        ticks_run = summary.ticks_run,
        total_reward = summary.total_reward,
        final_tick = summary.snapshot.tick,
        total_yield = summary.snapshot.totals.total_yield,
        sustainability = summary.snapshot.sustainability,
        "Episode ended"
    );
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use agroswarm_agents::ShapingTable;
    use agroswarm_types::{ActionKind, FieldCondition, ShapingCategory};

    use super::*;
    use crate::config::SimulationConfig;
    use crate::decision::{AgentDecision, IdlePolicy};

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.width = 10;
        config.world.height = 8;
        config.time.ticks_per_day = 20;
        config
    }

    struct MonitorPolicy {
        decisions: u64,
        rewards_seen: u64,
    }

    impl ActionPolicy for MonitorPolicy {
        fn decide(&mut self, _agent_index: usize, _sim: &Simulator) -> AgentDecision {
            self.decisions += 1;
            AgentDecision::stay(ActionKind::Monitor)
        }

        fn observe_reward(
            &mut self,
            _agent_index: usize,
            _decision: &AgentDecision,
            _reward: f64,
            _sim: &Simulator,
        ) {
            self.rewards_seen += 1;
        }
    }

    struct StopAfter(u64);

    impl TickCallback for StopAfter {
        fn on_tick(&mut self, summary: &TickSummary, _sim: &Simulator) -> ControlFlow<()> {
            if summary.tick >= self.0 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    }

    #[test]
    fn action_tick_cadence() {
        assert!(is_action_tick(0, 8));
        assert!(!is_action_tick(7, 8));
        assert!(is_action_tick(16, 8));
        assert!(!is_action_tick(0, 0));
    }

    #[test]
    fn runs_to_max_ticks() {
        let config = small_config();
        let mut sim = Simulator::new(&config);
        let runner = RunnerConfig {
            max_ticks: 25,
            ..RunnerConfig::default()
        };

        let summary =
            run_episode(&mut sim, &mut IdlePolicy, None, &runner, &mut NoOpCallback).unwrap();

        assert_eq!(summary.ticks_run, 25);
        assert_eq!(summary.end_reason, EndReason::MaxTicksReached);
        assert_eq!(summary.snapshot.tick, 25);
        assert_eq!(summary.snapshot.day, 1);
    }

    #[test]
    fn agents_act_every_action_tick() {
        let config = small_config();
        let mut sim = Simulator::new(&config);
        let mut policy = MonitorPolicy {
            decisions: 0,
            rewards_seen: 0,
        };
        let runner = RunnerConfig {
            max_ticks: 16,
            action_every: 8,
            ..RunnerConfig::default()
        };

        let summary =
            run_episode(&mut sim, &mut policy, None, &runner, &mut NoOpCallback).unwrap();

        // Ticks 0 and 8 are action ticks; six agents each.
        assert_eq!(policy.decisions, 12);
        assert_eq!(policy.rewards_seen, 12);
        assert_eq!(sim.totals().monitoring_count, 12);
        assert!((summary.total_reward - 12.0 * (0.01 - 0.001)).abs() < 1e-9);
    }

    #[test]
    fn callback_can_stop_an_unbounded_run() {
        let config = small_config();
        let mut sim = Simulator::new(&config);
        let runner = RunnerConfig::default();

        let summary =
            run_episode(&mut sim, &mut IdlePolicy, None, &runner, &mut StopAfter(5)).unwrap();

        assert_eq!(summary.ticks_run, 5);
        assert_eq!(summary.end_reason, EndReason::CallbackStop);
    }

    #[test]
    fn overrides_hold_weather_through_day_boundaries() {
        let config = small_config();
        let mut sim = Simulator::new(&config);
        let mut overrides = ConditionOverrides::new(ShapingTable::baseline(), 9);
        overrides.set(FieldCondition::Drought, true);
        let runner = RunnerConfig {
            max_ticks: 40,
            ..RunnerConfig::default()
        };

        let summary = run_episode(
            &mut sim,
            &mut IdlePolicy,
            Some(&mut overrides),
            &runner,
            &mut NoOpCallback,
        )
        .unwrap();

        assert_eq!(summary.snapshot.conditions, vec![FieldCondition::Drought]);

        // The final step resampled the weather on the day boundary.
        let shaping = sim.shaping().clone();
        overrides.apply(sim.weather_mut(), &shaping);
        assert!(sim.weather().temp >= 33.0);
        assert!(sim.weather().rain.abs() < f64::EPSILON);
        assert!((sim.shaping().multiplier(ShapingCategory::Irrigate) - 1.3).abs() < 1e-12);
    }

    #[test]
    fn idle_agents_on_base_recharge() {
        let config = small_config();
        let mut sim = Simulator::new(&config);
        let base = *sim.bases().first().unwrap();
        sim.place_agent(0, base).unwrap();
        sim.move_agent(0, 1, 0).unwrap();
        sim.move_agent(0, -1, 0).unwrap();
        let drained = sim.agent(0).unwrap().battery;

        run_agents(&mut sim, &mut IdlePolicy).unwrap();

        assert!(sim.agent(0).unwrap().battery > drained);
    }
}
