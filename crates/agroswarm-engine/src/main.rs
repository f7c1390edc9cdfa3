//! Engine binary for the AgroSwarm simulation.
//!
//! Loads configuration, builds the farm, and runs one episode with the
//! configured policy until the tick limit is reached.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `agroswarm-config.yaml` (defaults if absent)
//! 2. Initialize structured logging (tracing)
//! 3. Build the simulator
//! 4. Merge the advisory for the configured field report, if any
//! 5. Activate the configured field conditions
//! 6. Run the episode
//! 7. Log the result

mod error;
mod policy;
mod summary;

use std::path::Path;

use agroswarm_agents::{NeutralAdvisor, apply_advisory};
use agroswarm_core::conditions::ConditionOverrides;
use agroswarm_core::config::{LoggingConfig, PolicyKind, SimulationConfig};
use agroswarm_core::decision::{ActionPolicy, IdlePolicy};
use agroswarm_core::{Simulator, runner};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::policy::{PreferencePolicy, ScoutPolicy};
use crate::summary::DaySummaryCallback;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "agroswarm-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration loading or the episode fails.
fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging)?;
    info!(
        width = config.world.width,
        height = config.world.height,
        seed = config.world.seed,
        ticks_per_day = config.time.ticks_per_day,
        policy = ?config.runner.policy,
        "agroswarm-engine starting"
    );

    // 3. Build the farm.
    let mut sim = Simulator::new(&config);

    // 4. Advisory.
    if let Some(report) = config.runner.advisory_report.as_deref() {
        for line in apply_advisory(&NeutralAdvisor, report, sim.shaping()) {
            info!(advice = %line, "Advisory");
        }
    }

    // 5. Field conditions, layered on top of the post-advisory table.
    let mut overrides =
        ConditionOverrides::new(sim.shaping().snapshot(), config.world.seed.wrapping_add(1));
    for condition in &config.runner.conditions {
        overrides.set(*condition, true);
    }
    for message in overrides.messages() {
        info!(advice = message, "Field condition active");
    }
    let overrides = if config.runner.conditions.is_empty() {
        None
    } else {
        Some(&mut overrides)
    };

    // 6. Run the episode.
    let mut policy = build_policy(config.runner.policy, sim.agents().len(), config.world.seed);
    let mut callback = DaySummaryCallback::new(config.logging.summary_every_days);
    let result = runner::run_episode(
        &mut sim,
        policy.as_mut(),
        overrides,
        &config.runner,
        &mut callback,
    )?;

    // 7. Log results.
    runner::log_run_end(&result);
    info!(
        end_reason = ?result.end_reason,
        ticks_run = result.ticks_run,
        "agroswarm-engine shutdown complete"
    );

    Ok(())
}

/// Load the simulation configuration from [`CONFIG_PATH`].
fn load_config() -> Result<SimulationConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(SimulationConfig::from_file(config_path)?)
    } else {
        let mut config = SimulationConfig::default();
        config.apply_env_overrides();
        Ok(config)
    }
}

/// Install the global subscriber. `RUST_LOG` wins over `logging.level`.
fn init_logging(logging: &LoggingConfig) -> Result<(), EngineError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&logging.level).map_err(|e| EngineError::LogFilter {
            level: logging.level.clone(),
            message: e.to_string(),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
    Ok(())
}

/// Instantiate the configured policy. Policies draw from their own
/// stream, seeded off the world seed.
fn build_policy(kind: PolicyKind, agents: usize, seed: u64) -> Box<dyn ActionPolicy> {
    let policy_seed = seed.wrapping_add(2);
    match kind {
        PolicyKind::Idle => Box::new(IdlePolicy),
        PolicyKind::Scout => Box::new(ScoutPolicy::new(policy_seed)),
        PolicyKind::Preference => Box::new(PreferencePolicy::new(
            agents,
            PreferencePolicy::DEFAULT_LEARNING_RATE,
            policy_seed,
        )),
    }
}
