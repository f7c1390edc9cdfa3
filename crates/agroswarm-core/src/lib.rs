//! Farm clock, simulator orchestration, and episode runner for AgroSwarm.
//!
//! This crate owns the per-tick pipeline that drives the farm: weather,
//! then pest and disease spread, then growth. Agent actions are applied
//! between ticks by a driver, usually [`runner::run_episode`].
//!
//! # Modules
//!
//! - [`clock`] -- Tick counter and day derivation.
//! - [`conditions`] -- Operator-toggled field conditions that override
//!   weather and scale reward shaping.
//! - [`config`] -- Configuration loading from `agroswarm-config.yaml` into
//!   strongly-typed structs.
//! - [`decision`] -- [`ActionPolicy`] trait and [`IdlePolicy`].
//! - [`runner`] -- The episode loop.
//! - [`simulator`] -- [`Simulator`], the farm state and tick pipeline.
//! - [`sustainability`] -- The sustainability index.
//!
//! [`ActionPolicy`]: decision::ActionPolicy
//! [`IdlePolicy`]: decision::IdlePolicy
//! [`Simulator`]: simulator::Simulator

pub mod clock;
pub mod conditions;
pub mod config;
pub mod decision;
pub mod runner;
pub mod simulator;
pub mod sustainability;

pub use simulator::{SimError, Simulator, TickSummary};
