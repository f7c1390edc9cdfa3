//! Per-tick soil decay, crop growth, and the smoothed biodiversity score.
//!
//! Only planted cells change here. Fallow cells keep their soil levels until
//! an agent acts on them.

use agroswarm_types::{CropType, WeatherState, unit};
use serde::Deserialize;
use tracing::debug;

use crate::grid::FieldGrid;

/// Floor and ceiling of the smoothed biodiversity score.
const BIODIVERSITY_FLOOR: f64 = 0.2;
const BIODIVERSITY_CEILING: f64 = 1.0;

/// Guards `ln(0)` when a crop type is absent.
const LOG_EPSILON: f64 = 1e-6;

/// Parameters for [`growth_process`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GrowthParams {
    /// Moisture lost per tick.
    pub moisture_decay: f64,
    /// Nutrient lost per tick.
    pub nutrient_decay: f64,
    /// Base growth per tick, scaled by `0.5 + health`.
    pub growth_rate: f64,
    /// Moisture gained per tick while raining, before the humidity factor.
    pub rain_bonus: f64,
    /// Pest and disease removed per tick from well-kept cells.
    pub self_heal: f64,
    /// Moisture and nutrient must both exceed this for self-healing.
    pub self_heal_threshold: f64,
}

impl Default for GrowthParams {
    fn default() -> Self {
        Self {
            moisture_decay: 0.006,
            nutrient_decay: 0.0015,
            growth_rate: 0.002,
            rain_bonus: 0.18,
            self_heal: 0.0008,
            self_heal_threshold: 0.7,
        }
    }
}

/// Tick phase 3: decay soil, grow crops, self-heal healthy cells.
///
/// Rain adds `0.5 * rain_bonus * humidity` to moisture on every tick the
/// rain gate is open. Growth uses the health computed after this tick's
/// soil update.
pub fn growth_process(grid: &mut FieldGrid, weather: &WeatherState, params: &GrowthParams) {
    let rain_gain = if weather.is_raining() {
        0.5 * params.rain_bonus * weather.humidity
    } else {
        0.0
    };

    for cell in grid.cells_mut().iter_mut().filter(|c| c.has_crop()) {
        cell.moisture = unit(cell.moisture - params.moisture_decay + rain_gain);
        cell.nutrient = unit(cell.nutrient - params.nutrient_decay);
        let health = cell.health();
        cell.growth = unit(params.growth_rate.mul_add(0.5 + health, cell.growth));
        if cell.moisture > params.self_heal_threshold && cell.nutrient > params.self_heal_threshold {
            cell.pest = unit(cell.pest - params.self_heal);
            cell.disease = unit(cell.disease - params.self_heal);
        }
    }
}

/// Shannon evenness of the crop mix, divided by the number of crop types.
///
/// A perfectly even mix of all types scores 1; a monoculture scores about
/// `1 / COUNT`. Returns `None` when nothing is planted.
#[allow(clippy::cast_precision_loss)]
pub fn crop_evenness(counts: &[usize; CropType::COUNT]) -> Option<f64> {
    let total: usize = counts.iter().sum();
    if total == 0 {
        return None;
    }
    let total = total as f64;
    let entropy: f64 = counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * (p + LOG_EPSILON).ln()
        })
        .sum();
    Some((-entropy).exp() / CropType::COUNT as f64)
}

/// Exponentially smoothed biodiversity score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiodiversityTracker {
    score: f64,
}

impl Default for BiodiversityTracker {
    fn default() -> Self {
        Self {
            score: BIODIVERSITY_CEILING,
        }
    }
}

impl BiodiversityTracker {
    /// The current smoothed score, in `[0.2, 1]`.
    pub const fn score(&self) -> f64 {
        self.score
    }

    /// Blend the current crop mix 50/50 into the score.
    ///
    /// Skipped when the field has no crops. Returns the new score.
    pub fn update(&mut self, grid: &FieldGrid) -> f64 {
        let Some(evenness) = crop_evenness(&grid.crop_counts()) else {
            debug!(score = self.score, "No crops planted, biodiversity held");
            return self.score;
        };
        let sample = evenness.clamp(BIODIVERSITY_FLOOR, BIODIVERSITY_CEILING);
        self.score = self
            .score
            .mul_add(0.5, 0.5 * sample)
            .clamp(BIODIVERSITY_FLOOR, BIODIVERSITY_CEILING);
        self.score
    }
}
