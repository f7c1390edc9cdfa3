//! The farm simulator: grid, weather, agents, and the per-tick pipeline.
//!
//! Each call to [`Simulator::step`] runs three phases in order:
//!
//! 1. **Weather** -- advance the clock; on a day boundary, resample the
//!    global weather.
//! 2. **Spread** -- diffuse pests and disease from the pre-tick grid into
//!    delta buffers, then fold them in.
//! 3. **Growth** -- decay soil, grow crops, self-heal, and refresh the
//!    smoothed biodiversity score.
//!
//! Agent actions are not part of the tick. A driver applies them through
//! [`Simulator::apply_action`] at whatever cadence it likes, between ticks.
//!
//! Every stochastic draw, from initial seeding to harvest replanting, comes
//! from one `ChaCha8Rng` owned by the simulator. Two simulators built from
//! the same configuration and driven with the same calls evolve
//! identically.

use agroswarm_agents::{
    ActionConfig, ActionContext, ActionCosts, ActionOutcome, AgentConfig, AgentError,
    RewardConfig, ShapingHandle, execute, move_agent, recharge_if_docked, spawn_agents,
};
use agroswarm_types::{ActionKind, AgentState, Cell, FarmSnapshot, FarmTotals, Position, WeatherState};
use agroswarm_world::{
    BiodiversityTracker, FieldGrid, GrowthParams, SpreadParams, SpreadReport, WeatherSystem,
    WorldError, growth_process, seed_field, spread_process,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::clock::{ClockError, FarmClock};
use crate::config::SimulationConfig;
use crate::sustainability::{SustainabilityConfig, sustainability_index};

/// Errors surfaced by the simulator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SimError {
    /// A clock operation failed.
    #[error("clock error: {source}")]
    Clock {
        /// The underlying clock error.
        #[from]
        source: ClockError,
    },

    /// An agent lookup or action failed.
    #[error("agent error: {source}")]
    Agent {
        /// The underlying agent error.
        #[from]
        source: AgentError,
    },

    /// A grid lookup failed.
    #[error("world error: {source}")]
    World {
        /// The underlying world error.
        #[from]
        source: WorldError,
    },
}

/// Summary of a single tick's execution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickSummary {
    /// The tick number that was executed.
    pub tick: u64,
    /// The day index after this tick.
    pub day: u64,
    /// Whether the weather was resampled this tick.
    pub weather_changed: bool,
    /// Infection draws that succeeded during the spread phase.
    pub spread: SpreadReport,
    /// Smoothed biodiversity score after the growth phase.
    pub biodiversity: f64,
}

/// The farm simulation.
#[derive(Debug, Clone)]
pub struct Simulator {
    grid: FieldGrid,
    weather: WeatherState,
    agents: Vec<AgentState>,
    bases: Vec<Position>,
    totals: FarmTotals,
    biodiversity: BiodiversityTracker,
    clock: FarmClock,
    weather_system: WeatherSystem,
    growth: GrowthParams,
    spread: SpreadParams,
    agent_config: AgentConfig,
    actions: ActionConfig,
    rewards: RewardConfig,
    costs: ActionCosts,
    sustainability: SustainabilityConfig,
    shaping: ShapingHandle,
    rng: ChaCha8Rng,
}

impl Simulator {
    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Build a simulator with its own shaping table initialised from
    /// `config.shaping`.
    pub fn new(config: &SimulationConfig) -> Self {
        Self::with_shaping(config, ShapingHandle::new(config.shaping.clone()))
    }

    /// Build a simulator that reads multipliers from an existing shared
    /// handle. `config.shaping` is ignored.
    pub fn with_shaping(config: &SimulationConfig, shaping: ShapingHandle) -> Self {
        Self::from_rng(config, shaping, ChaCha8Rng::seed_from_u64(config.world.seed))
    }

    /// Build a simulator drawing from `rng`.
    ///
    /// Dimensions and rates are trusted as supplied.
    pub fn from_rng(config: &SimulationConfig, shaping: ShapingHandle, mut rng: ChaCha8Rng) -> Self {
        let width = config.world.width;
        let height = config.world.height;

        let mut grid = FieldGrid::new(width, height);
        let planted = seed_field(&mut grid, &config.planting, &mut rng);

        let bases = config.agents.bases_for(width, height);
        let agents = spawn_agents(&config.agents, &bases, width, height, &mut rng);

        info!(
            width,
            height,
            seed = config.world.seed,
            planted,
            agents = agents.len(),
            "Farm initialised"
        );

        Self {
            grid,
            weather: config.weather.initial_state(),
            agents,
            bases,
            totals: FarmTotals::default(),
            biodiversity: BiodiversityTracker::default(),
            clock: FarmClock::new(config.time.ticks_per_day),
            weather_system: WeatherSystem::new(config.weather.clone(), config.time.ticks_per_day),
            growth: config.growth.clone(),
            spread: config.spread.clone(),
            agent_config: config.agents.clone(),
            actions: config.actions.clone(),
            rewards: config.rewards.clone(),
            costs: config.costs.clone(),
            sustainability: config.sustainability.clone(),
            shaping,
            rng,
        }
    }

    // -----------------------------------------------------------------------
    // Tick pipeline
    // -----------------------------------------------------------------------

    /// Advance one tick: weather, then spread, then growth.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::Clock`] if the tick counter would overflow.
    pub fn step(&mut self) -> Result<TickSummary, SimError> {
        let tick = self.clock.advance()?;
        let weather_changed = self.step_weather();
        let spread = self.spread_process();
        let biodiversity = self.growth_process();

        let day = self.clock.day();
        if weather_changed {
            info!(
                tick,
                day,
                temp = self.weather.temp,
                humidity = self.weather.humidity,
                raining = self.weather.is_raining(),
                total_yield = self.totals.total_yield,
                "New day"
            );
        }

        Ok(TickSummary {
            tick,
            day,
            weather_changed,
            spread,
            biodiversity,
        })
    }

    /// Tick phase 1: resample the weather if the current tick is a day
    /// boundary. Returns whether it did.
    pub fn step_weather(&mut self) -> bool {
        self.weather_system
            .step(&mut self.weather, self.clock.tick(), &mut self.rng)
    }

    /// Tick phase 2: pest and disease diffusion.
    pub fn spread_process(&mut self) -> SpreadReport {
        spread_process(&mut self.grid, &self.weather, &self.spread, &mut self.rng)
    }

    /// Tick phase 3: soil decay and crop growth, then the biodiversity
    /// update. Returns the new biodiversity score.
    pub fn growth_process(&mut self) -> f64 {
        growth_process(&mut self.grid, &self.weather, &self.growth);
        self.biodiversity.update(&self.grid)
    }

    // -----------------------------------------------------------------------
    // Agent interventions
    // -----------------------------------------------------------------------

    /// Apply `action` for agent `agent_index` on the cell it stands on and
    /// return the net reward.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an out-of-range index.
    pub fn apply_action(&mut self, agent_index: usize, action: ActionKind) -> Result<f64, SimError> {
        Ok(self.apply_action_outcome(agent_index, action)?.reward)
    }

    /// Like [`Self::apply_action`], but also report what the action did.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an out-of-range index.
    pub fn apply_action_outcome(
        &mut self,
        agent_index: usize,
        action: ActionKind,
    ) -> Result<ActionOutcome, SimError> {
        let agent = self
            .agents
            .get_mut(agent_index)
            .ok_or(AgentError::AgentNotFound(agent_index))?;
        let cell = self.grid.cell_mut(agent.position)?;
        let ctx = ActionContext {
            effects: &self.actions,
            rewards: &self.rewards,
            costs: &self.costs,
            shaping: &self.shaping,
        };
        let outcome = execute(action, agent, cell, &mut self.totals, ctx, &mut self.rng);
        debug!(
            tick = self.clock.tick(),
            agent = agent_index,
            action = %action,
            reward = outcome.reward,
            "Action applied"
        );
        Ok(outcome)
    }

    /// Apply an action given by name.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::UnknownAction`] if `name` is not one of the
    /// seven action names; nothing is mutated in that case.
    pub fn apply_named_action(&mut self, agent_index: usize, name: &str) -> Result<f64, SimError> {
        let action: ActionKind = name.parse().map_err(AgentError::from)?;
        self.apply_action(agent_index, action)
    }

    /// Move an agent by `(dx, dy)`, clamped to the field. Returns whether
    /// its position changed.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an out-of-range index.
    pub fn move_agent(&mut self, agent_index: usize, dx: isize, dy: isize) -> Result<bool, SimError> {
        let (width, height) = (self.grid.width(), self.grid.height());
        let agent = self
            .agents
            .get_mut(agent_index)
            .ok_or(AgentError::AgentNotFound(agent_index))?;
        Ok(move_agent(agent, dx, dy, width, height, &self.agent_config))
    }

    /// Recharge an agent that is idle on a base. Returns whether it was.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::AgentNotFound`] for an out-of-range index.
    pub fn recharge_agent(&mut self, agent_index: usize) -> Result<bool, SimError> {
        let agent = self
            .agents
            .get_mut(agent_index)
            .ok_or(AgentError::AgentNotFound(agent_index))?;
        Ok(recharge_if_docked(agent, &self.bases, &self.agent_config))
    }

    /// Teleport an agent, for scenario setup.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `position` is off the field,
    /// or [`AgentError::AgentNotFound`] for an out-of-range index.
    pub fn place_agent(&mut self, agent_index: usize, position: Position) -> Result<(), SimError> {
        self.grid.cell(position)?;
        self.agent_mut(agent_index)?.position = position;
        Ok(())
    }

    fn agent_mut(&mut self, agent_index: usize) -> Result<&mut AgentState, SimError> {
        self.agents
            .get_mut(agent_index)
            .ok_or_else(|| AgentError::AgentNotFound(agent_index).into())
    }

    // -----------------------------------------------------------------------
    // Read surface
    // -----------------------------------------------------------------------

    /// The blended water, chemical, and biodiversity score in `[0, 1]`.
    pub fn sustainability_index(&self) -> f64 {
        sustainability_index(&self.totals, self.biodiversity.score(), &self.sustainability)
    }

    /// The field.
    pub const fn grid(&self) -> &FieldGrid {
        &self.grid
    }

    /// Field width.
    pub const fn width(&self) -> usize {
        self.grid.width()
    }

    /// Field height.
    pub const fn height(&self) -> usize {
        self.grid.height()
    }

    /// The cell at `position`.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `position` is off the field.
    pub fn cell(&self, position: Position) -> Result<&Cell, SimError> {
        Ok(self.grid.cell(position)?)
    }

    /// Overwrite one cell, for scenario setup. The stored cell is
    /// normalized: every level is clamped to `[0, 1]` and fallow ground
    /// carries no growth.
    ///
    /// # Errors
    ///
    /// Returns [`WorldError::OutOfBounds`] if `position` is off the field.
    pub fn set_cell(&mut self, position: Position, mut cell: Cell) -> Result<(), SimError> {
        cell.normalize();
        *self.grid.cell_mut(position)? = cell;
        Ok(())
    }

    /// All agents, in roster order.
    pub fn agents(&self) -> &[AgentState] {
        &self.agents
    }

    /// One agent.
    pub fn agent(&self, agent_index: usize) -> Option<&AgentState> {
        self.agents.get(agent_index)
    }

    /// Base stations where idle agents recharge.
    pub fn bases(&self) -> &[Position] {
        &self.bases
    }

    /// Current weather.
    pub const fn weather(&self) -> &WeatherState {
        &self.weather
    }

    /// Overwrite weather between ticks. Values are not re-validated.
    pub const fn weather_mut(&mut self) -> &mut WeatherState {
        &mut self.weather
    }

    /// Cumulative counters.
    pub const fn totals(&self) -> &FarmTotals {
        &self.totals
    }

    /// The clock.
    pub const fn clock(&self) -> &FarmClock {
        &self.clock
    }

    /// Ticks elapsed.
    pub const fn tick(&self) -> u64 {
        self.clock.tick()
    }

    /// Day index.
    pub fn day(&self) -> u64 {
        self.clock.day()
    }

    /// Smoothed biodiversity score.
    pub const fn biodiversity_score(&self) -> f64 {
        self.biodiversity.score()
    }

    /// The shared shaping table. Clone the handle to write to it from
    /// elsewhere.
    pub const fn shaping(&self) -> &ShapingHandle {
        &self.shaping
    }

    /// Serializable read model of the farm.
    pub fn snapshot(&self) -> FarmSnapshot {
        FarmSnapshot {
            tick: self.clock.tick(),
            day: self.clock.day(),
            totals: self.totals.clone(),
            sustainability: self.sustainability_index(),
            biodiversity: self.biodiversity.score(),
            weather: self.weather.clone(),
            shaping: self.shaping.snapshot().into_map(),
            conditions: Vec::new(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use agroswarm_types::CropType;

    use super::*;

    fn small_config() -> SimulationConfig {
        let mut config = SimulationConfig::default();
        config.world.width = 8;
        config.world.height = 6;
        config.time.ticks_per_day = 10;
        config
    }

    #[test]
    fn construction_respects_dimensions_and_roster() {
        let sim = Simulator::new(&small_config());
        assert_eq!(sim.grid().len(), 48);
        assert_eq!(sim.agents().len(), 6);
        for agent in sim.agents() {
            assert!(agent.position.x < 8 && agent.position.y < 6);
        }
        assert_eq!(sim.tick(), 0);
        assert!((sim.biodiversity_score() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn step_advances_tick_and_day() {
        let mut sim = Simulator::new(&small_config());
        for _ in 0..9 {
            let summary = sim.step().unwrap();
            assert!(!summary.weather_changed);
            assert_eq!(summary.day, 0);
        }
        let summary = sim.step().unwrap();
        assert_eq!(summary.tick, 10);
        assert_eq!(summary.day, 1);
        assert!(summary.weather_changed);
    }

    #[test]
    fn unknown_agent_is_an_error() {
        let mut sim = Simulator::new(&small_config());
        let err = sim.apply_action(99, ActionKind::Monitor).unwrap_err();
        assert_eq!(err, SimError::from(AgentError::AgentNotFound(99)));
    }

    #[test]
    fn named_action_dispatches() {
        let mut sim = Simulator::new(&small_config());
        sim.apply_named_action(0, "monitor").unwrap();
        assert_eq!(sim.totals().monitoring_count, 1);
        assert_eq!(sim.agent(0).unwrap().last_action, ActionKind::Monitor);
    }

    #[test]
    fn unknown_action_name_fails_without_side_effects() {
        let mut sim = Simulator::new(&small_config());
        let before = sim.agent(0).unwrap().clone();

        let err = sim.apply_named_action(0, "plough").unwrap_err();

        assert_eq!(err, SimError::from(AgentError::UnknownAction("plough".to_owned())));
        assert_eq!(sim.agent(0).unwrap(), &before);
    }

    #[test]
    fn action_stamps_the_agents_cell() {
        let mut sim = Simulator::new(&small_config());
        sim.place_agent(2, Position::new(3, 3)).unwrap();

        sim.apply_action(2, ActionKind::Fertilize).unwrap();

        assert_eq!(
            sim.cell(Position::new(3, 3)).unwrap().last_action,
            ActionKind::Fertilize
        );
    }

    #[test]
    fn place_agent_rejects_off_field_positions() {
        let mut sim = Simulator::new(&small_config());
        let err = sim.place_agent(0, Position::new(8, 0)).unwrap_err();
        assert!(matches!(err, SimError::World { .. }));
    }

    #[test]
    fn move_and_recharge_round_trip() {
        let mut sim = Simulator::new(&small_config());
        assert_eq!(sim.bases().first(), Some(&Position::new(1, 1)));
        sim.place_agent(0, Position::new(2, 1)).unwrap();

        assert!(sim.move_agent(0, -1, 0).unwrap());
        let drained = sim.agent(0).unwrap().battery;
        assert!((drained - 0.9985).abs() < 1e-12);

        sim.apply_action(0, ActionKind::Idle).unwrap();
        assert!(sim.recharge_agent(0).unwrap());
        assert!((sim.agent(0).unwrap().battery - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn weather_can_be_overwritten_between_ticks() {
        let mut sim = Simulator::new(&small_config());
        sim.weather_mut().rain = 1.0;
        sim.weather_mut().humidity = 2.5;
        sim.step().unwrap();
        assert!((sim.weather().humidity - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn shaping_writes_are_seen_by_the_next_action() {
        let mut sim = Simulator::new(&small_config());
        let collaborator = sim.shaping().clone();
        collaborator.set(agroswarm_types::ShapingCategory::Monitor, 3.0);

        let reward = sim.apply_action(0, ActionKind::Monitor).unwrap();

        assert!((reward - (0.01 * 3.0 - 0.001)).abs() < 1e-12);
    }

    #[test]
    fn snapshot_reports_current_state() {
        let mut sim = Simulator::new(&small_config());
        sim.apply_action(0, ActionKind::Irrigate).unwrap();
        sim.step().unwrap();

        let snap = sim.snapshot();

        assert_eq!(snap.tick, 1);
        assert!((snap.totals.water_used - 1.0).abs() < f64::EPSILON);
        assert!((snap.sustainability - sim.sustainability_index()).abs() < f64::EPSILON);
        assert_eq!(snap.shaping.len(), 5);
    }

    #[test]
    fn harvest_through_simulator_updates_totals() {
        let mut sim = Simulator::new(&small_config());
        let pos = Position::new(4, 4);
        sim.place_agent(1, pos).unwrap();
        sim.set_cell(
            pos,
            Cell {
                crop: Some(CropType::Wheat),
                moisture: 0.8,
                nutrient: 0.8,
                growth: 0.95,
                ..Cell::fallow()
            },
        )
        .unwrap();

        let reward = sim.apply_action(1, ActionKind::Harvest).unwrap();

        assert!(reward > 0.0);
        assert!(sim.totals().total_yield > 0.0);
        assert_eq!(sim.agent(1).unwrap().harvested_today, 1);
    }
}
