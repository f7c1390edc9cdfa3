//! Pest and disease diffusion between neighbouring cells.
//!
//! The pass is simultaneous: every source reads the grid as it stood at the
//! start of the tick, and contributions land in two delta buffers sized to
//! the grid. Only after the whole pass are the buffers folded back into the
//! cells. Writing in place would let a freshly infected cell re-infect its
//! neighbours within the same tick.
//!
//! Multiple successful infections of one target keep the *largest* single
//! contribution, not their sum.

use agroswarm_types::{WeatherState, unit};
use rand::Rng;
use serde::Deserialize;
use tracing::debug;

use crate::grid::FieldGrid;

/// Parameters for [`spread_process`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpreadParams {
    /// Per-neighbour pest infection probability per unit of source pest.
    pub pest_spread_rate: f64,
    /// Per-neighbour disease infection probability per unit of source disease.
    pub disease_spread_rate: f64,
    /// How strongly the wind biases pest spread downwind.
    pub wind_variance: f64,
    /// A cell only spreads once its level exceeds this.
    pub activation_threshold: f64,
    /// Fraction of the source pest level a successful infection carries.
    pub pest_contribution: f64,
    /// Fraction of the source disease level a successful infection carries.
    pub disease_contribution: f64,
}

impl Default for SpreadParams {
    fn default() -> Self {
        Self {
            pest_spread_rate: 0.0025,
            disease_spread_rate: 0.0018,
            wind_variance: 0.4,
            activation_threshold: 0.05,
            pest_contribution: 0.15,
            disease_contribution: 0.12,
        }
    }
}

/// Counts of successful infection draws during one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpreadReport {
    /// Pest infection draws that succeeded.
    pub pest_infections: u32,
    /// Disease infection draws that succeeded.
    pub disease_infections: u32,
}

/// Per-cell increments accumulated during one spread pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SpreadDeltas {
    pest: Vec<f64>,
    disease: Vec<f64>,
}

impl SpreadDeltas {
    /// Zeroed buffers for `len` cells.
    pub fn zeroed(len: usize) -> Self {
        Self {
            pest: vec![0.0; len],
            disease: vec![0.0; len],
        }
    }

    /// Pest increments in storage order.
    pub fn pest(&self) -> &[f64] {
        &self.pest
    }

    /// Disease increments in storage order.
    pub fn disease(&self) -> &[f64] {
        &self.disease
    }

    /// Run the stochastic pass over `grid` without touching it.
    pub fn compute(
        grid: &FieldGrid,
        weather: &WeatherState,
        params: &SpreadParams,
        rng: &mut impl Rng,
    ) -> (Self, SpreadReport) {
        let mut deltas = Self::zeroed(grid.len());
        let mut report = SpreadReport::default();

        for (pos, cell) in grid.iter() {
            if cell.pest > params.activation_threshold {
                for (nx, ny) in grid.neighbors(pos.x, pos.y) {
                    let bias_x = downwind_bias(nx > pos.x, params.wind_variance, weather.wind_dx);
                    let bias_y = downwind_bias(ny > pos.y, params.wind_variance, weather.wind_dy);
                    let p = params.pest_spread_rate * cell.pest * bias_x * bias_y;
                    if rng.random::<f64>() < p {
                        let contribution = params.pest_contribution * cell.pest;
                        if let Some(slot) = grid.index_of(nx, ny).and_then(|i| deltas.pest.get_mut(i)) {
                            *slot = slot.max(contribution);
                        }
                        report.pest_infections = report.pest_infections.saturating_add(1);
                    }
                }
            }

            if cell.disease > params.activation_threshold {
                for (nx, ny) in grid.neighbors(pos.x, pos.y) {
                    let p = params.disease_spread_rate * cell.disease;
                    if rng.random::<f64>() < p {
                        let contribution = params.disease_contribution * cell.disease;
                        if let Some(slot) =
                            grid.index_of(nx, ny).and_then(|i| deltas.disease.get_mut(i))
                        {
                            *slot = slot.max(contribution);
                        }
                        report.disease_infections = report.disease_infections.saturating_add(1);
                    }
                }
            }
        }

        (deltas, report)
    }

    /// Add the increments to `grid` and clamp each level to `[0, 1]`.
    pub fn apply(&self, grid: &mut FieldGrid) {
        for ((cell, dp), dd) in grid
            .cells_mut()
            .iter_mut()
            .zip(&self.pest)
            .zip(&self.disease)
        {
            cell.pest = unit(cell.pest + dp);
            cell.disease = unit(cell.disease + dd);
        }
    }
}

/// Multiplicative wind bias along one axis; only neighbours strictly
/// downwind on that axis are biased.
fn downwind_bias(downwind: bool, wind_variance: f64, wind_component: f64) -> f64 {
    if downwind {
        wind_variance.mul_add(wind_component, 1.0)
    } else {
        1.0
    }
}

/// Tick phase 2: diffuse pests and disease across the field.
pub fn spread_process(
    grid: &mut FieldGrid,
    weather: &WeatherState,
    params: &SpreadParams,
    rng: &mut impl Rng,
) -> SpreadReport {
    let (deltas, report) = SpreadDeltas::compute(grid, weather, params, rng);
    deltas.apply(grid);
    if report.pest_infections > 0 || report.disease_infections > 0 {
        debug!(
            pest = report.pest_infections,
            disease = report.disease_infections,
            "Spread pass infected neighbours"
        );
    }
    report
}
