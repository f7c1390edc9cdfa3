//! The farm sustainability index.
//!
//! ```text
//! index = w_water / (1 + k_water * water_used)
//!       + w_chem  / (1 + k_chem  * chem_used)
//!       + w_bio   * biodiversity
//! ```
//!
//! clamped to `[0, 1]`. Resource terms decay hyperbolically with use, so
//! the index stays bounded however much water or chemical is spent.

use agroswarm_types::{FarmTotals, unit};
use serde::Deserialize;

/// Weights and decay constants for [`sustainability_index`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SustainabilityConfig {
    /// Weight of the water-efficiency term (default: 0.35).
    pub water_weight: f64,
    /// Weight of the chemical-efficiency term (default: 0.35).
    pub chem_weight: f64,
    /// Weight of the biodiversity term (default: 0.30).
    pub biodiversity_weight: f64,
    /// Decay constant per irrigation (default: 0.02).
    pub water_k: f64,
    /// Decay constant per chemical application (default: 0.03).
    pub chem_k: f64,
}

impl Default for SustainabilityConfig {
    fn default() -> Self {
        Self {
            water_weight: 0.35,
            chem_weight: 0.35,
            biodiversity_weight: 0.30,
            water_k: 0.02,
            chem_k: 0.03,
        }
    }
}

/// Compute the sustainability index. Pure.
pub fn sustainability_index(
    totals: &FarmTotals,
    biodiversity: f64,
    config: &SustainabilityConfig,
) -> f64 {
    let water = 1.0 / config.water_k.mul_add(totals.water_used, 1.0);
    let chem = 1.0 / config.chem_k.mul_add(totals.chem_used, 1.0);
    let raw = config.biodiversity_weight.mul_add(
        biodiversity,
        config.water_weight.mul_add(water, config.chem_weight * chem),
    );
    unit(raw)
}
