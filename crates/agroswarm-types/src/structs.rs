//! Core value structs for the AgroSwarm simulation.
//!
//! These are pure data: the engine crates mutate them, collaborators
//! (dashboards, policies) read them. Agents reference cells only through a
//! [`Position`], never by holding a reference into the grid.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ActionKind, CropType, FieldCondition};

/// Clamp a value to the unit interval `[0, 1]`.
///
/// `NaN` collapses to 0 so that no invariant-violating value can be stored.
pub fn unit(value: f64) -> f64 {
    if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A grid coordinate. `x` is the column, `y` the row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Position {
    /// Column index.
    pub x: usize,
    /// Row index.
    pub y: usize,
}

impl Position {
    /// Create a position from a column and row.
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// Soil and crop state of one field tile.
///
/// All five scalar fields live in `[0, 1]`. `growth` is 0 whenever `crop`
/// is `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Cell {
    /// The crop planted here, or `None` if fallow.
    pub crop: Option<CropType>,
    /// Soil moisture.
    pub moisture: f64,
    /// Soil nutrient level.
    pub nutrient: f64,
    /// Pest pressure.
    pub pest: f64,
    /// Disease pressure.
    pub disease: f64,
    /// Crop maturity.
    pub growth: f64,
    /// The last action any agent performed on this cell.
    pub last_action: ActionKind,
}

impl Default for Cell {
    fn default() -> Self {
        Self::fallow()
    }
}

impl Cell {
    /// A fallow cell with baseline soil.
    pub const fn fallow() -> Self {
        Self {
            crop: None,
            moisture: 0.6,
            nutrient: 0.7,
            pest: 0.0,
            disease: 0.0,
            growth: 0.0,
            last_action: ActionKind::Idle,
        }
    }

    /// Derived crop health.
    ///
    /// `clamp(0.5 * (moisture + nutrient) - 0.6 * pest - 0.6 * disease, 0, 1)`
    pub fn health(&self) -> f64 {
        let good = 0.5 * (self.moisture + self.nutrient);
        let bad = 0.6 * self.pest + 0.6 * self.disease;
        unit(good - bad)
    }

    /// Whether a crop is planted.
    pub const fn has_crop(&self) -> bool {
        self.crop.is_some()
    }

    /// Replace the crop. Clearing it also clears growth.
    pub const fn set_crop(&mut self, crop: Option<CropType>) {
        self.crop = crop;
        if crop.is_none() {
            self.growth = 0.0;
        }
    }

    /// Re-clamp every scalar field and re-assert the fallow-growth rule.
    pub fn normalize(&mut self) {
        self.moisture = unit(self.moisture);
        self.nutrient = unit(self.nutrient);
        self.pest = unit(self.pest);
        self.disease = unit(self.disease);
        self.growth = if self.crop.is_some() { unit(self.growth) } else { 0.0 };
    }
}

// ---------------------------------------------------------------------------
// Weather
// ---------------------------------------------------------------------------

/// Global atmospheric state shared by every cell.
///
/// May be overwritten directly between ticks; the engine does not
/// re-validate these fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WeatherState {
    /// Air temperature in degrees Celsius.
    pub temp: f64,
    /// Relative humidity, 0 to 1.
    pub humidity: f64,
    /// Rain gate: 0 for dry, 1 for raining.
    pub rain: f64,
    /// Wind component along the x axis, -1 to 1.
    pub wind_dx: f64,
    /// Wind component along the y axis, -1 to 1.
    pub wind_dy: f64,
}

impl Default for WeatherState {
    fn default() -> Self {
        Self {
            temp: 29.0,
            humidity: 0.55,
            rain: 0.0,
            wind_dx: 0.0,
            wind_dy: 0.0,
        }
    }
}

impl WeatherState {
    /// Whether the rain gate is open.
    pub fn is_raining(&self) -> bool {
        self.rain > 0.0
    }
}

// ---------------------------------------------------------------------------
// Agent
// ---------------------------------------------------------------------------

/// Mutable state of one field agent (drone or rover).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AgentState {
    /// Current grid position, always within the grid.
    pub position: Position,
    /// Remaining battery, 0 to 1.
    pub battery: f64,
    /// The last action this agent performed.
    pub last_action: ActionKind,
    /// Running reward total. Unbounded.
    pub reward: f64,
    /// Successful harvests. Never reset by the engine.
    pub harvested_today: u32,
}

impl AgentState {
    /// A fresh agent at `position` with a full battery.
    pub const fn new(position: Position, battery: f64) -> Self {
        Self {
            position,
            battery,
            last_action: ActionKind::Idle,
            reward: 0.0,
            harvested_today: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Cumulative farm-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FarmTotals {
    /// Sum of all harvest yield gains.
    pub total_yield: f64,
    /// Number of irrigation applications.
    pub water_used: f64,
    /// Number of pesticide and fungicide applications.
    pub chem_used: f64,
    /// Number of monitoring actions.
    pub monitoring_count: u64,
}

/// Read model of the whole farm at one instant, for dashboards and exports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct FarmSnapshot {
    /// Ticks elapsed.
    pub tick: u64,
    /// Day index (`tick / ticks_per_day`).
    pub day: u64,
    /// Cumulative counters.
    pub totals: FarmTotals,
    /// Current sustainability index.
    pub sustainability: f64,
    /// Current smoothed biodiversity score.
    pub biodiversity: f64,
    /// Current weather.
    pub weather: WeatherState,
    /// Reward-shaping multipliers in effect.
    pub shaping: BTreeMap<String, f64>,
    /// Field conditions forced on by the operator, in canonical order.
    #[serde(default)]
    pub conditions: Vec<FieldCondition>,
}
