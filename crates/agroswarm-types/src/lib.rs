//! Shared type definitions for the AgroSwarm field simulation.
//!
//! This crate is the single source of truth for the value types every
//! other crate in the workspace passes around. Types flow downstream to
//! `TypeScript` via `ts-rs` for the field dashboard.
//!
//! # Modules
//!
//! - [`enums`] -- Crops, actions, shaping categories, field conditions
//! - [`structs`] -- Cells, weather, agents, farm totals, snapshots

pub mod enums;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ActionKind, CropType, FieldCondition, ParseActionError, ShapingCategory};
pub use structs::{
    AgentState, Cell, FarmSnapshot, FarmTotals, Position, WeatherState, unit,
};
