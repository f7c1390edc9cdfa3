//! Initial field seeding: crop placement and starting infestations.
//!
//! Every cell gets an independent Bernoulli draw for crop presence. Planted
//! cells start with a little growth and carry small independent chances of
//! an initial pest or disease outbreak. Fallow cells are left untouched.

use agroswarm_types::{CropType, unit};
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::grid::FieldGrid;

/// Parameters for [`seed_field`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlantingParams {
    /// Probability that a cell starts with a crop.
    pub crop_density: f64,
    /// Lower bound of the initial growth draw.
    pub initial_growth_min: f64,
    /// Upper bound of the initial growth draw.
    pub initial_growth_max: f64,
    /// Probability that a planted cell starts infested.
    pub pest_start_chance: f64,
    /// Lower bound of the starting pest level.
    pub pest_start_min: f64,
    /// Upper bound of the starting pest level.
    pub pest_start_max: f64,
    /// Probability that a planted cell starts diseased.
    pub disease_start_chance: f64,
    /// Lower bound of the starting disease level.
    pub disease_start_min: f64,
    /// Upper bound of the starting disease level.
    pub disease_start_max: f64,
}

impl Default for PlantingParams {
    fn default() -> Self {
        Self {
            crop_density: 0.85,
            initial_growth_min: 0.15,
            initial_growth_max: 0.4,
            pest_start_chance: 0.03,
            pest_start_min: 0.2,
            pest_start_max: 0.6,
            disease_start_chance: 0.02,
            disease_start_min: 0.2,
            disease_start_max: 0.5,
        }
    }
}

/// Pick a crop type uniformly at random.
pub fn random_crop(rng: &mut impl Rng) -> CropType {
    let i = rng.random_range(0..CropType::COUNT);
    CropType::ALL.get(i).copied().unwrap_or(CropType::Wheat)
}

/// Draw uniformly from `[min, max]`, tolerating an inverted or empty range.
pub fn uniform(rng: &mut impl Rng, min: f64, max: f64) -> f64 {
    let span = max - min;
    rng.random::<f64>().mul_add(span, min)
}

/// Seed crops, growth, pests, and diseases across `grid`.
///
/// Returns the number of cells that received a crop.
pub fn seed_field(grid: &mut FieldGrid, params: &PlantingParams, rng: &mut impl Rng) -> usize {
    let mut planted: usize = 0;
    for cell in grid.cells_mut() {
        if rng.random::<f64>() >= params.crop_density {
            continue;
        }
        cell.set_crop(Some(random_crop(rng)));
        cell.growth = unit(uniform(rng, params.initial_growth_min, params.initial_growth_max));
        if rng.random::<f64>() < params.pest_start_chance {
            cell.pest = unit(uniform(rng, params.pest_start_min, params.pest_start_max));
        }
        if rng.random::<f64>() < params.disease_start_chance {
            cell.disease = unit(uniform(rng, params.disease_start_min, params.disease_start_max));
        }
        planted = planted.saturating_add(1);
    }
    debug!(planted, cells = grid.len(), "Field seeded");
    planted
}
