//! Operator-toggled field conditions.
//!
//! While a condition is active, [`ConditionOverrides::apply`] forces the
//! weather into that condition's envelope and scales the relevant reward
//! multipliers. Shaping is rebuilt from the captured base table on every
//! call, so toggling a condition off restores the base multipliers on the
//! next apply.
//!
//! Wind redraws come from a dedicated RNG so that toggling conditions does
//! not perturb the simulator's own random stream.

use std::collections::BTreeSet;

use agroswarm_agents::{ShapingHandle, ShapingTable};
use agroswarm_types::{FieldCondition, ShapingCategory, WeatherState};
use agroswarm_world::uniform;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

/// The set of active field conditions plus the shaping base they scale.
#[derive(Debug, Clone)]
pub struct ConditionOverrides {
    active: BTreeSet<FieldCondition>,
    base: ShapingTable,
    rng: ChaCha8Rng,
}

impl ConditionOverrides {
    /// No active conditions. `base` is the table every apply starts from.
    pub fn new(base: ShapingTable, seed: u64) -> Self {
        Self {
            active: BTreeSet::new(),
            base,
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Switch `condition` on or off.
    ///
    /// Switching on deactivates its mutually exclusive partner.
    pub fn set(&mut self, condition: FieldCondition, on: bool) {
        if on {
            if let Some(other) = condition.exclusive_with() {
                self.active.remove(&other);
            }
            self.active.insert(condition);
        } else {
            self.active.remove(&condition);
        }
        debug!(?condition, on, "Field condition toggled");
    }

    /// Flip `condition`. Returns its new state.
    pub fn toggle(&mut self, condition: FieldCondition) -> bool {
        let on = !self.is_active(condition);
        self.set(condition, on);
        on
    }

    /// Whether `condition` is active.
    pub fn is_active(&self, condition: FieldCondition) -> bool {
        self.active.contains(&condition)
    }

    /// Active conditions in canonical order.
    pub fn active(&self) -> impl Iterator<Item = FieldCondition> + '_ {
        self.active.iter().copied()
    }

    /// The base shaping table.
    pub const fn base(&self) -> &ShapingTable {
        &self.base
    }

    /// Override `weather` for every active condition and merge the scaled
    /// base table into `shaping`.
    pub fn apply(&mut self, weather: &mut WeatherState, shaping: &ShapingHandle) {
        let mut table = self.base.clone();
        let rainy = self.is_active(FieldCondition::Rainy);

        for condition in FieldCondition::ALL {
            if !self.active.contains(&condition) {
                continue;
            }
            match condition {
                FieldCondition::Rainy => {
                    weather.rain = 1.0;
                    weather.humidity = weather.humidity.max(0.78);
                    weather.temp = weather.temp.clamp(20.0, 32.0);
                    self.redraw_wind(weather, 0.3);
                    table.scale(ShapingCategory::Irrigate, 0.75);
                    table.scale(ShapingCategory::Monitor, 1.05);
                    table.scale(ShapingCategory::Fungicide, 1.05);
                }
                FieldCondition::Sunny => {
                    weather.rain = 0.0;
                    weather.humidity = weather.humidity.min(0.5);
                    weather.temp = weather.temp.max(31.0);
                    self.redraw_wind(weather, 0.2);
                    table.scale(ShapingCategory::Irrigate, 1.10);
                    table.scale(ShapingCategory::Monitor, 1.05);
                }
                FieldCondition::WindStorm => {
                    self.redraw_wind(weather, 1.0);
                    if !rainy {
                        weather.rain = 0.0;
                        weather.humidity = weather.humidity.clamp(0.3, 0.7);
                    }
                    table.scale(ShapingCategory::Monitor, 1.15);
                    table.scale(ShapingCategory::Pesticide, 1.05);
                }
                FieldCondition::Drought => {
                    weather.rain = 0.0;
                    weather.humidity = weather.humidity.min(0.35);
                    weather.temp = weather.temp.max(33.0);
                    self.redraw_wind(weather, 0.3);
                    table.scale(ShapingCategory::Irrigate, 1.30);
                    table.scale(ShapingCategory::Monitor, 1.05);
                }
            }
        }

        shaping.merge(&table);
    }

    fn redraw_wind(&mut self, weather: &mut WeatherState, limit: f64) {
        weather.wind_dx = uniform(&mut self.rng, -limit, limit);
        weather.wind_dy = uniform(&mut self.rng, -limit, limit);
    }

    /// One advisory line per active condition.
    pub fn messages(&self) -> Vec<&'static str> {
        self.active()
            .map(|condition| match condition {
                FieldCondition::Rainy => "Rainy -- reduce irrigation; check drainage.",
                FieldCondition::Sunny => "Sunny -- watch moisture; irrigate if dry.",
                FieldCondition::WindStorm => "Wind storm -- inspect lodging/damage; map hotspots.",
                FieldCondition::Drought => "Drought -- irrigate more; schedule water smartly.",
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn rainy_and_sunny_are_exclusive() {
        let mut overrides = ConditionOverrides::new(ShapingTable::baseline(), 1);
        overrides.set(FieldCondition::Rainy, true);
        overrides.set(FieldCondition::Sunny, true);
        assert!(!overrides.is_active(FieldCondition::Rainy));
        assert!(overrides.is_active(FieldCondition::Sunny));

        overrides.set(FieldCondition::Drought, true);
        assert_eq!(
            overrides.active().collect::<Vec<_>>(),
            vec![FieldCondition::Sunny, FieldCondition::Drought]
        );
    }

    #[test]
    fn toggle_flips_state() {
        let mut overrides = ConditionOverrides::new(ShapingTable::baseline(), 1);
        assert!(overrides.toggle(FieldCondition::WindStorm));
        assert!(!overrides.toggle(FieldCondition::WindStorm));
        assert_eq!(overrides.active().count(), 0);
    }

    #[test]
    fn rainy_forces_wet_mild_weather() {
        let mut overrides = ConditionOverrides::new(ShapingTable::baseline(), 7);
        overrides.set(FieldCondition::Rainy, true);
        let shaping = ShapingHandle::default();
        let mut weather = WeatherState {
            temp: 40.0,
            humidity: 0.2,
            ..WeatherState::default()
        };

        overrides.apply(&mut weather, &shaping);

        assert!(close(weather.rain, 1.0));
        assert!(close(weather.humidity, 0.78));
        assert!(close(weather.temp, 32.0));
        assert!(weather.wind_dx.abs() <= 0.3 && weather.wind_dy.abs() <= 0.3);
        assert!(close(shaping.multiplier(ShapingCategory::Irrigate), 0.75));
        assert!(close(shaping.multiplier(ShapingCategory::Fungicide), 1.05));
    }

    #[test]
    fn wind_storm_keeps_rain_when_rainy() {
        let mut overrides = ConditionOverrides::new(ShapingTable::baseline(), 7);
        overrides.set(FieldCondition::Rainy, true);
        overrides.set(FieldCondition::WindStorm, true);
        let shaping = ShapingHandle::default();
        let mut weather = WeatherState::default();

        overrides.apply(&mut weather, &shaping);

        assert!(close(weather.rain, 1.0));
        assert!(close(shaping.multiplier(ShapingCategory::Monitor), 1.05 * 1.15));
    }

    #[test]
    fn wind_storm_alone_dries_and_bounds_humidity() {
        let mut overrides = ConditionOverrides::new(ShapingTable::baseline(), 7);
        overrides.set(FieldCondition::WindStorm, true);
        let shaping = ShapingHandle::default();
        let mut weather = WeatherState {
            rain: 1.0,
            humidity: 0.95,
            ..WeatherState::default()
        };

        overrides.apply(&mut weather, &shaping);

        assert!(weather.rain.abs() < f64::EPSILON);
        assert!(close(weather.humidity, 0.7));
        assert!(close(shaping.multiplier(ShapingCategory::Pesticide), 1.05));
    }

    #[test]
    fn drought_compounds_with_base_table() {
        let mut base = ShapingTable::baseline();
        base.set(ShapingCategory::Irrigate, 2.0);
        let mut overrides = ConditionOverrides::new(base, 3);
        overrides.set(FieldCondition::Drought, true);
        let shaping = ShapingHandle::default();
        let mut weather = WeatherState::default();

        overrides.apply(&mut weather, &shaping);
        overrides.apply(&mut weather, &shaping);

        assert!(close(weather.temp, 33.0));
        assert!(close(weather.humidity, 0.35));
        assert!(close(shaping.multiplier(ShapingCategory::Irrigate), 2.6));
    }

    #[test]
    fn deactivating_restores_base_multipliers() {
        let mut overrides = ConditionOverrides::new(ShapingTable::baseline(), 3);
        overrides.set(FieldCondition::Sunny, true);
        let shaping = ShapingHandle::default();
        let mut weather = WeatherState::default();

        overrides.apply(&mut weather, &shaping);
        assert!(close(shaping.multiplier(ShapingCategory::Irrigate), 1.10));

        overrides.set(FieldCondition::Sunny, false);
        overrides.apply(&mut weather, &shaping);
        assert!(close(shaping.multiplier(ShapingCategory::Irrigate), 1.0));
    }

    #[test]
    fn messages_follow_active_conditions() {
        let mut overrides = ConditionOverrides::new(ShapingTable::baseline(), 3);
        assert!(overrides.messages().is_empty());
        overrides.set(FieldCondition::Drought, true);
        overrides.set(FieldCondition::Rainy, true);
        assert_eq!(
            overrides.messages(),
            vec![
                "Rainy -- reduce irrigation; check drainage.",
                "Drought -- irrigate more; schedule water smartly.",
            ]
        );
    }
}
