//! Built-in action policies.
//!
//! - [`ScoutPolicy`]: fixed thresholds on the agent's own cell, wandering
//!   and monitoring when nothing needs doing.
//! - [`PreferencePolicy`]: one table of action preferences per agent,
//!   keyed on a coarse bucketing of the cell, sampled through a softmax
//!   and nudged by every reward.

use std::collections::BTreeMap;

use agroswarm_core::Simulator;
use agroswarm_core::decision::{ActionPolicy, AgentDecision};
use agroswarm_types::{ActionKind, Cell, Position};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Wander offsets: stay, or one step along an axis.
const MOVES: [(isize, isize); 5] = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];

fn random_move(rng: &mut impl Rng) -> (isize, isize) {
    MOVES
        .get(rng.random_range(0..MOVES.len()))
        .copied()
        .unwrap_or((0, 0))
}

fn cell_under<'a>(sim: &'a Simulator, agent_index: usize) -> Option<&'a Cell> {
    let agent = sim.agent(agent_index)?;
    sim.cell(agent.position).ok()
}

// ---------------------------------------------------------------------------
// Scout
// ---------------------------------------------------------------------------

/// Threshold rules evaluated in priority order on the agent's cell.
#[derive(Debug, Clone)]
pub struct ScoutPolicy {
    rng: ChaCha8Rng,
}

impl ScoutPolicy {
    /// Create a scout policy with its own random stream.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl ActionPolicy for ScoutPolicy {
    fn decide(&mut self, agent_index: usize, sim: &Simulator) -> AgentDecision {
        let Some(cell) = cell_under(sim, agent_index) else {
            return AgentDecision::stay(ActionKind::Idle);
        };

        let action = if cell.pest > 0.5 {
            Some(ActionKind::ApplyPesticide)
        } else if cell.disease > 0.4 {
            Some(ActionKind::ApplyFungicide)
        } else if cell.moisture < 0.35 {
            Some(ActionKind::Irrigate)
        } else if cell.nutrient < 0.35 {
            Some(ActionKind::Fertilize)
        } else if cell.has_crop() && cell.growth > 0.85 && cell.health() > 0.6 {
            Some(ActionKind::Harvest)
        } else {
            None
        };

        match action {
            Some(action) => AgentDecision::stay(action),
            None => AgentDecision {
                action: ActionKind::Monitor,
                step: random_move(&mut self.rng),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Preference
// ---------------------------------------------------------------------------

/// Coarse view of a cell used as the preference-table key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateKey {
    moisture: u8,
    nutrient: u8,
    pest: u8,
    disease: u8,
    growth: u8,
    has_crop: bool,
}

impl StateKey {
    /// Bucket `cell` into quarters.
    pub fn of(cell: &Cell) -> Self {
        Self {
            moisture: quarter(cell.moisture.clamp(0.0, 0.999)),
            nutrient: quarter(cell.nutrient.clamp(0.0, 0.999)),
            pest: quarter(cell.pest.clamp(0.0, 0.999)),
            disease: quarter(cell.disease.clamp(0.0, 0.999)),
            growth: quarter(cell.growth.clamp(0.0, 1.0)),
            has_crop: cell.has_crop(),
        }
    }
}

/// `floor(4 * value)` for a value already clamped to `[0, 1]`.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn quarter(value: f64) -> u8 {
    (value * 4.0).floor() as u8
}

type Preferences = BTreeMap<ActionKind, f64>;

/// Tabular softmax policy trained online from rewards.
#[derive(Debug, Clone)]
pub struct PreferencePolicy {
    learning_rate: f64,
    tables: Vec<BTreeMap<StateKey, Preferences>>,
    pending: Vec<Option<(StateKey, ActionKind)>>,
    rng: ChaCha8Rng,
}

impl PreferencePolicy {
    /// Default step size for preference updates.
    pub const DEFAULT_LEARNING_RATE: f64 = 0.05;

    /// Chance per decision of a random wander instead of heading for the
    /// field centre.
    const WANDER_CHANCE: f64 = 0.7;

    /// Create a policy for `agents` agents.
    pub fn new(agents: usize, learning_rate: f64, seed: u64) -> Self {
        Self {
            learning_rate,
            tables: vec![BTreeMap::new(); agents],
            pending: vec![None; agents],
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Number of distinct states agent `agent_index` has visited.
    pub fn states_seen(&self, agent_index: usize) -> usize {
        self.tables.get(agent_index).map_or(0, BTreeMap::len)
    }

    /// Preference for `action` in `state`, if the state has been visited.
    pub fn preference(&self, agent_index: usize, state: StateKey, action: ActionKind) -> Option<f64> {
        self.tables
            .get(agent_index)?
            .get(&state)?
            .get(&action)
            .copied()
    }

    fn step_toward(&mut self, from: Position, centre: Position) -> (isize, isize) {
        let dx = self.axis_step(from.x, centre.x);
        let dy = self.axis_step(from.y, centre.y);
        (dx, dy)
    }

    fn axis_step(&mut self, from: usize, to: usize) -> isize {
        if from == to || !self.rng.random_bool(0.5) {
            0
        } else if from < to {
            1
        } else {
            -1
        }
    }

    fn sample(&mut self, prefs: &Preferences) -> ActionKind {
        let max = prefs.values().copied().fold(f64::NEG_INFINITY, f64::max);
        let weights: Vec<(ActionKind, f64)> = prefs
            .iter()
            .map(|(action, pref)| (*action, (pref - max).exp()))
            .collect();
        let total: f64 = weights.iter().map(|(_, w)| w).sum();

        let mut draw = self.rng.random::<f64>() * total;
        for (action, weight) in &weights {
            if draw < *weight {
                return *action;
            }
            draw -= weight;
        }
        weights.last().map_or(ActionKind::Idle, |(action, _)| *action)
    }
}

impl ActionPolicy for PreferencePolicy {
    fn decide(&mut self, agent_index: usize, sim: &Simulator) -> AgentDecision {
        let (Some(agent), Some(cell)) = (sim.agent(agent_index), cell_under(sim, agent_index)) else {
            return AgentDecision::stay(ActionKind::Idle);
        };

        let step = if self.rng.random::<f64>() < Self::WANDER_CHANCE {
            random_move(&mut self.rng)
        } else {
            let centre = Position::new(
                sim.width().checked_div(2).unwrap_or(0),
                sim.height().checked_div(2).unwrap_or(0),
            );
            self.step_toward(agent.position, centre)
        };

        // The state is read before the move, as the agent sees it now.
        let state = StateKey::of(cell);
        let prefs = self
            .tables
            .get_mut(agent_index)
            .map(|table| {
                table
                    .entry(state)
                    .or_insert_with(|| ActionKind::ALL.iter().map(|a| (*a, 0.0)).collect())
                    .clone()
            })
            .unwrap_or_default();
        let action = if prefs.is_empty() {
            ActionKind::Idle
        } else {
            self.sample(&prefs)
        };

        if let Some(slot) = self.pending.get_mut(agent_index) {
            *slot = Some((state, action));
        }
        AgentDecision { action, step }
    }

    fn observe_reward(
        &mut self,
        agent_index: usize,
        _decision: &AgentDecision,
        reward: f64,
        _sim: &Simulator,
    ) {
        let Some((state, action)) = self.pending.get(agent_index).copied().flatten() else {
            return;
        };
        let Some(prefs) = self
            .tables
            .get_mut(agent_index)
            .and_then(|table| table.get_mut(&state))
        else {
            return;
        };

        let decay = 1.0 - self.learning_rate * 0.01;
        for pref in prefs.values_mut() {
            *pref *= decay;
        }
        if let Some(pref) = prefs.get_mut(&action) {
            *pref += self.learning_rate * reward;
        }
    }
}
