//! Action execution and costs for field agents.
//!
//! # Submodules
//!
//! - [`costs`] -- The per-action cost table.
//! - [`handlers`] -- One execution handler per action variant.

pub mod costs;
pub mod handlers;
