//! Execution handlers for field actions.
//!
//! One handler per [`ActionKind`] variant, dispatched exhaustively by
//! [`execute`]. A handler mutates the cell under the agent and the farm
//! totals, then returns the reward *before* operating cost; [`execute`]
//! subtracts the cost, stamps the last-action tags, and credits the agent.
//!
//! Shaping multipliers are read from the shared handle inside each handler,
//! at the moment the reward is computed.

use agroswarm_types::{ActionKind, AgentState, Cell, CropType, FarmTotals, unit};
use agroswarm_world::random_crop;
use rand::Rng;
use tracing::debug;

use crate::config::{ActionConfig, RewardConfig};
use crate::shaping::ShapingHandle;

use super::costs::ActionCosts;

/// Everything a handler reads besides the cell, agent, and totals.
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    /// Effect magnitudes and harvest gates.
    pub effects: &'a ActionConfig,
    /// Base rewards.
    pub rewards: &'a RewardConfig,
    /// Per-action costs.
    pub costs: &'a ActionCosts,
    /// Live shaping multipliers.
    pub shaping: &'a ShapingHandle,
}

/// What an action did to the field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionEffect {
    /// Nothing happened.
    None,
    /// The monitoring counter was incremented.
    Monitored,
    /// Moisture was added.
    Irrigated,
    /// Pest or disease was reduced by `removed`.
    Treated {
        /// Level actually removed (before minus after).
        removed: f64,
    },
    /// Nutrient was added.
    Fertilized,
    /// A crop was harvested.
    Harvested {
        /// The crop that was harvested.
        crop: CropType,
        /// Yield credited to the farm.
        yield_gain: f64,
        /// The crop planted in its place, if any.
        replanted: Option<CropType>,
    },
    /// The harvest gates were not met; the cell is unchanged.
    HarvestRejected,
}

/// Result of one action application.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionOutcome {
    /// Net reward credited to the agent, after cost.
    pub reward: f64,
    /// What the action did.
    pub effect: ActionEffect,
}

/// Apply `action` for `agent` to `cell`.
///
/// `cell` must be the cell at the agent's position; the caller resolves
/// it. Every call sets both last-action tags, charges the scaled cost, and
/// adds the reward to the agent's running total.
pub fn execute(
    action: ActionKind,
    agent: &mut AgentState,
    cell: &mut Cell,
    totals: &mut FarmTotals,
    ctx: ActionContext<'_>,
    rng: &mut impl Rng,
) -> ActionOutcome {
    agent.last_action = action;
    cell.last_action = action;

    let (gross, effect) = match action {
        ActionKind::Idle => (0.0, ActionEffect::None),
        ActionKind::Monitor => handle_monitor(totals, ctx),
        ActionKind::Irrigate => handle_irrigate(cell, totals, ctx),
        ActionKind::ApplyPesticide => handle_pesticide(cell, totals, ctx),
        ActionKind::ApplyFungicide => handle_fungicide(cell, totals, ctx),
        ActionKind::Fertilize => handle_fertilize(cell, ctx),
        ActionKind::Harvest => handle_harvest(agent, cell, totals, ctx, rng),
    };

    let cost = ctx.rewards.action_cost_scale * ctx.costs.cost(action);
    let reward = gross - cost;
    agent.reward += reward;

    ActionOutcome { reward, effect }
}

/// The live multiplier for `action`, or 1 if the action is never shaped.
fn shaped(ctx: ActionContext<'_>, action: ActionKind) -> f64 {
    action
        .shaping_category()
        .map_or(1.0, |category| ctx.shaping.multiplier(category))
}

fn handle_monitor(totals: &mut FarmTotals, ctx: ActionContext<'_>) -> (f64, ActionEffect) {
    totals.monitoring_count = totals.monitoring_count.saturating_add(1);
    let reward = ctx.rewards.monitor * shaped(ctx, ActionKind::Monitor);
    (reward, ActionEffect::Monitored)
}

fn handle_irrigate(
    cell: &mut Cell,
    totals: &mut FarmTotals,
    ctx: ActionContext<'_>,
) -> (f64, ActionEffect) {
    cell.moisture = unit(cell.moisture + ctx.effects.irrigate_amount);
    totals.water_used += 1.0;
    let reward = ctx.rewards.irrigate * shaped(ctx, ActionKind::Irrigate);
    (reward, ActionEffect::Irrigated)
}

/// Remove `fraction` of `level` and return the amount actually removed.
fn treat(level: &mut f64, fraction: f64) -> f64 {
    let before = *level;
    *level = unit(before - before * fraction);
    before - *level
}

fn handle_pesticide(
    cell: &mut Cell,
    totals: &mut FarmTotals,
    ctx: ActionContext<'_>,
) -> (f64, ActionEffect) {
    let removed = treat(&mut cell.pest, ctx.effects.treatment_fraction);
    totals.chem_used += 1.0;
    let reward = ctx.rewards.treatment * removed * shaped(ctx, ActionKind::ApplyPesticide);
    (reward, ActionEffect::Treated { removed })
}

fn handle_fungicide(
    cell: &mut Cell,
    totals: &mut FarmTotals,
    ctx: ActionContext<'_>,
) -> (f64, ActionEffect) {
    let removed = treat(&mut cell.disease, ctx.effects.treatment_fraction);
    totals.chem_used += 1.0;
    let reward = ctx.rewards.treatment * removed * shaped(ctx, ActionKind::ApplyFungicide);
    (reward, ActionEffect::Treated { removed })
}

fn handle_fertilize(cell: &mut Cell, ctx: ActionContext<'_>) -> (f64, ActionEffect) {
    cell.nutrient = unit(cell.nutrient + ctx.effects.fertilize_amount);
    let reward = ctx.rewards.fertilize * shaped(ctx, ActionKind::Fertilize);
    (reward, ActionEffect::Fertilized)
}

/// Whether `cell` meets the harvest gates.
pub fn harvest_ready(cell: &Cell, effects: &ActionConfig) -> bool {
    cell.has_crop()
        && cell.growth > effects.harvest_growth_threshold
        && cell.health() > effects.harvest_health_threshold
}

fn handle_harvest(
    agent: &mut AgentState,
    cell: &mut Cell,
    totals: &mut FarmTotals,
    ctx: ActionContext<'_>,
    rng: &mut impl Rng,
) -> (f64, ActionEffect) {
    let Some(crop) = cell.crop.filter(|_| harvest_ready(cell, ctx.effects)) else {
        return (
            -ctx.rewards.harvest_failure_penalty,
            ActionEffect::HarvestRejected,
        );
    };

    let yield_gain = crop.value_weight() * 0.6_f64.mul_add(cell.health(), 0.4);
    totals.total_yield += yield_gain;
    agent.harvested_today = agent.harvested_today.saturating_add(1);

    let replanted = if rng.random::<f64>() < ctx.effects.replant_chance {
        Some(random_crop(rng))
    } else {
        None
    };
    cell.set_crop(replanted);
    cell.growth = 0.0;
    cell.pest = unit(cell.pest * ctx.effects.disturbance_factor);
    cell.disease = unit(cell.disease * ctx.effects.disturbance_factor);

    debug!(
        crop = %crop,
        yield_gain,
        replanted = ?replanted,
        x = agent.position.x,
        y = agent.position.y,
        "Harvested"
    );

    (
        ctx.rewards.yield_weight * yield_gain,
        ActionEffect::Harvested {
            crop,
            yield_gain,
            replanted,
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use agroswarm_types::{Position, ShapingCategory};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    struct Fixture {
        effects: ActionConfig,
        rewards: RewardConfig,
        costs: ActionCosts,
        shaping: ShapingHandle,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                effects: ActionConfig::default(),
                rewards: RewardConfig::default(),
                costs: ActionCosts::default(),
                shaping: ShapingHandle::default(),
            }
        }

        fn ctx(&self) -> ActionContext<'_> {
            ActionContext {
                effects: &self.effects,
                rewards: &self.rewards,
                costs: &self.costs,
                shaping: &self.shaping,
            }
        }
    }

    fn agent() -> AgentState {
        AgentState::new(Position::new(0, 0), 1.0)
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn idle_only_stamps_tags() {
        let fx = Fixture::new();
        let mut agent = agent();
        agent.last_action = ActionKind::Monitor;
        let mut cell = Cell::fallow();
        let mut totals = FarmTotals::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let out = execute(ActionKind::Idle, &mut agent, &mut cell, &mut totals, fx.ctx(), &mut rng);

        assert!(close(out.reward, 0.0));
        assert_eq!(out.effect, ActionEffect::None);
        assert_eq!(agent.last_action, ActionKind::Idle);
        assert_eq!(totals, FarmTotals::default());
    }

    #[test]
    fn irrigate_adds_water_and_pays_cost() {
        let fx = Fixture::new();
        let mut agent = agent();
        let mut cell = Cell {
            moisture: 0.8,
            ..Cell::fallow()
        };
        let mut totals = FarmTotals::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let out = execute(ActionKind::Irrigate, &mut agent, &mut cell, &mut totals, fx.ctx(), &mut rng);

        assert!(close(cell.moisture, 1.0));
        assert!(close(totals.water_used, 1.0));
        assert!(close(out.reward, 0.05 - 0.01));
        assert!(close(agent.reward, out.reward));
        assert_eq!(cell.last_action, ActionKind::Irrigate);
    }

    #[test]
    fn treatment_reward_tracks_actual_reduction() {
        let fx = Fixture::new();
        let mut agent = agent();
        let mut cell = Cell {
            pest: 0.5,
            ..Cell::fallow()
        };
        let mut totals = FarmTotals::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let out = execute(
            ActionKind::ApplyPesticide,
            &mut agent,
            &mut cell,
            &mut totals,
            fx.ctx(),
            &mut rng,
        );

        assert!(close(cell.pest, 0.3));
        assert!(close(out.reward, 0.08 * 0.2 - 0.012));
        assert!(close(totals.chem_used, 1.0));
    }

    #[test]
    fn treating_a_clean_cell_only_costs() {
        let fx = Fixture::new();
        let mut agent = agent();
        let mut cell = Cell::fallow();
        let mut totals = FarmTotals::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let out = execute(
            ActionKind::ApplyFungicide,
            &mut agent,
            &mut cell,
            &mut totals,
            fx.ctx(),
            &mut rng,
        );

        assert_eq!(out.effect, ActionEffect::Treated { removed: 0.0 });
        assert!(close(out.reward, -0.012));
        assert!(close(totals.chem_used, 1.0));
    }

    #[test]
    fn multiplier_is_read_at_point_of_use() {
        let fx = Fixture::new();
        let collaborator = fx.shaping.clone();
        let mut agent = agent();
        let mut cell = Cell::fallow();
        let mut totals = FarmTotals::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        collaborator.set(ShapingCategory::Fertilize, 2.0);
        let out = execute(ActionKind::Fertilize, &mut agent, &mut cell, &mut totals, fx.ctx(), &mut rng);

        assert!(close(out.reward, 0.05 * 2.0 - 0.009));
        assert!(close(cell.nutrient, 0.95));
    }

    #[test]
    fn each_action_scales_by_its_own_category() {
        let infested = || Cell {
            pest: 0.5,
            disease: 0.5,
            ..Cell::fallow()
        };
        let gross = |fx: &Fixture, action: ActionKind| {
            let mut cell = infested();
            let mut totals = FarmTotals::default();
            let mut rng = ChaCha8Rng::seed_from_u64(42);
            let out = execute(action, &mut agent(), &mut cell, &mut totals, fx.ctx(), &mut rng);
            out.reward + fx.costs.cost(action)
        };

        for action in ActionKind::ALL {
            let Some(category) = action.shaping_category() else {
                continue;
            };
            let fx = Fixture::new();
            let baseline = gross(&fx, action);
            fx.shaping.set(category, 3.0);
            assert!(close(gross(&fx, action), baseline * 3.0), "{action}");

            for other in ShapingCategory::ALL.into_iter().filter(|c| *c != category) {
                let fx = Fixture::new();
                fx.shaping.set(other, 3.0);
                assert!(close(gross(&fx, action), baseline), "{action} vs {other:?}");
            }
        }
    }

    #[test]
    fn monitor_counts_and_rewards() {
        let fx = Fixture::new();
        let mut agent = agent();
        let mut cell = Cell::fallow();
        let mut totals = FarmTotals::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let out = execute(ActionKind::Monitor, &mut agent, &mut cell, &mut totals, fx.ctx(), &mut rng);

        assert_eq!(totals.monitoring_count, 1);
        assert!(close(out.reward, 0.01 - 0.001));
    }

    #[test]
    fn eligible_harvest_yields_and_resets() {
        let fx = Fixture::new();
        let mut agent = agent();
        // health = 0.5 * (0.6 + 0.6) = 0.6
        let mut cell = Cell {
            crop: Some(CropType::Corn),
            moisture: 0.6,
            nutrient: 0.6,
            growth: 0.9,
            ..Cell::fallow()
        };
        let mut totals = FarmTotals::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let out = execute(ActionKind::Harvest, &mut agent, &mut cell, &mut totals, fx.ctx(), &mut rng);

        let expected_yield = 1.3 * (0.4 + 0.6 * 0.6);
        assert!(close(totals.total_yield, expected_yield));
        assert!(close(out.reward, 2.0 * expected_yield - 0.003));
        assert!(close(cell.growth, 0.0));
        assert_eq!(agent.harvested_today, 1);
        assert!(matches!(out.effect, ActionEffect::Harvested { crop: CropType::Corn, .. }));
    }

    #[test]
    fn harvest_disturbs_pests() {
        let fx = Fixture::new();
        let mut agent = agent();
        let mut cell = Cell {
            crop: Some(CropType::Wheat),
            moisture: 1.0,
            nutrient: 1.0,
            pest: 0.2,
            disease: 0.1,
            growth: 0.95,
            ..Cell::fallow()
        };
        let mut totals = FarmTotals::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        execute(ActionKind::Harvest, &mut agent, &mut cell, &mut totals, fx.ctx(), &mut rng);

        assert!(close(cell.pest, 0.06));
        assert!(close(cell.disease, 0.03));
    }

    #[test]
    fn immature_harvest_is_penalised_and_leaves_cell() {
        let fx = Fixture::new();
        let mut agent = agent();
        let mut cell = Cell {
            crop: Some(CropType::Soy),
            moisture: 0.6,
            nutrient: 0.6,
            growth: 0.5,
            ..Cell::fallow()
        };
        let mut totals = FarmTotals::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let out = execute(ActionKind::Harvest, &mut agent, &mut cell, &mut totals, fx.ctx(), &mut rng);

        assert_eq!(out.effect, ActionEffect::HarvestRejected);
        assert!(close(out.reward, -0.02 - 0.003));
        assert!(close(totals.total_yield, 0.0));
        assert!(close(cell.growth, 0.5));
        assert_eq!(cell.crop, Some(CropType::Soy));
        assert_eq!(cell.last_action, ActionKind::Harvest);
    }

    #[test]
    fn fallow_harvest_is_rejected() {
        let fx = Fixture::new();
        let cell = Cell {
            growth: 0.0,
            ..Cell::fallow()
        };
        assert!(!harvest_ready(&cell, &fx.effects));
    }

    #[test]
    fn unhealthy_harvest_is_rejected() {
        let fx = Fixture::new();
        let cell = Cell {
            crop: Some(CropType::Wheat),
            growth: 0.95,
            pest: 0.5,
            ..Cell::fallow()
        };
        // health = 0.65 - 0.3 = 0.35
        assert!(!harvest_ready(&cell, &fx.effects));
    }

    #[test]
    fn replant_frequency_tracks_chance() {
        let fx = Fixture::new();
        let mut rng = ChaCha8Rng::seed_from_u64(77);
        let mut replanted = 0_u32;
        for _ in 0..2_000 {
            let mut agent = agent();
            let mut totals = FarmTotals::default();
            let mut cell = Cell {
                crop: Some(CropType::Wheat),
                moisture: 1.0,
                nutrient: 1.0,
                growth: 1.0,
                ..Cell::fallow()
            };
            execute(ActionKind::Harvest, &mut agent, &mut cell, &mut totals, fx.ctx(), &mut rng);
            if cell.has_crop() {
                replanted = replanted.saturating_add(1);
            }
        }
        let share = f64::from(replanted) / 2_000.0;
        assert!(share > 0.65 && share < 0.75, "share {share}");
    }
}
