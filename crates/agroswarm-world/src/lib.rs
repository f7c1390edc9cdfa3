//! The field itself for the AgroSwarm simulation.
//!
//! This crate owns the cell grid and the three per-tick world phases that
//! run in order: weather, spread, growth. It knows nothing about agents;
//! actions are applied by `agroswarm-agents` through grid coordinates.
//!
//! # Modules
//!
//! - [`error`] -- Error types for grid lookups.
//! - [`grid`] -- [`FieldGrid`], the fixed-size row-major cell matrix with
//!   8-connected neighbour queries.
//! - [`planting`] -- Initial crop, pest, and disease seeding.
//! - [`weather`] -- Day-boundary weather resampling with Box-Muller
//!   Gaussian draws.
//! - [`spread`] -- Simultaneous-update pest and disease diffusion.
//! - [`growth`] -- Soil decay, crop growth, self-healing, and the smoothed
//!   biodiversity score.

pub mod error;
pub mod grid;
pub mod growth;
pub mod planting;
pub mod spread;
pub mod weather;

// Re-export primary types at crate root.
pub use error::WorldError;
pub use grid::FieldGrid;
pub use growth::{BiodiversityTracker, GrowthParams, crop_evenness, growth_process};
pub use planting::{PlantingParams, random_crop, seed_field, uniform};
pub use spread::{SpreadDeltas, SpreadParams, SpreadReport, spread_process};
pub use weather::{WeatherParams, WeatherSystem, gaussian, is_day_boundary};
