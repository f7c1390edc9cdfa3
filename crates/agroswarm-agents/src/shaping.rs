//! Reward-shaping multipliers.
//!
//! The multiplier table is written by collaborators (an advisory service,
//! operator toggles) and read by the action handlers at the moment a reward
//! is computed. It is shared through [`ShapingHandle`], a cloneable
//! `Arc<RwLock<..>>`; the engine never caches a copy of the values.
//!
//! Keys are plain strings. Unknown keys are stored and reported but never
//! consulted; missing keys read as 1.0. Values are not range-checked.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use agroswarm_types::ShapingCategory;
use serde::{Deserialize, Serialize};

/// Multiplier read for a category that has no entry.
pub const NEUTRAL_MULTIPLIER: f64 = 1.0;

/// Summary line reported when no advisory rule fires.
pub const NO_ALERTS_SUMMARY: &str = "No special alerts -- follow standard best practices.";

// ---------------------------------------------------------------------------
// ShapingTable
// ---------------------------------------------------------------------------

/// A mapping from multiplier key (e.g. `irrigate_multiplier`) to value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShapingTable(BTreeMap<String, f64>);

impl Default for ShapingTable {
    fn default() -> Self {
        Self::baseline()
    }
}

impl ShapingTable {
    /// Every category at 1.0.
    pub fn baseline() -> Self {
        Self(
            ShapingCategory::ALL
                .into_iter()
                .map(|c| (c.key().to_owned(), NEUTRAL_MULTIPLIER))
                .collect(),
        )
    }

    /// An empty table. Every category reads as 1.0.
    pub const fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// The multiplier for `category`, defaulting to 1.0.
    pub fn get(&self, category: ShapingCategory) -> f64 {
        self.0
            .get(category.key())
            .copied()
            .unwrap_or(NEUTRAL_MULTIPLIER)
    }

    /// Overwrite the multiplier for `category`.
    pub fn set(&mut self, category: ShapingCategory, value: f64) {
        self.0.insert(category.key().to_owned(), value);
    }

    /// Overwrite the value under an arbitrary key.
    pub fn insert(&mut self, key: impl Into<String>, value: f64) {
        self.0.insert(key.into(), value);
    }

    /// Multiply the current multiplier for `category` by `factor`.
    pub fn scale(&mut self, category: ShapingCategory, factor: f64) {
        let current = self.get(category);
        self.set(category, current * factor);
    }

    /// Overwrite every key present in `other`, keeping the rest.
    pub fn merge(&mut self, other: &Self) {
        for (key, value) in &other.0 {
            self.0.insert(key.clone(), *value);
        }
    }

    /// Consume the table into its map.
    pub fn into_map(self) -> BTreeMap<String, f64> {
        self.0
    }
}

impl From<BTreeMap<String, f64>> for ShapingTable {
    fn from(map: BTreeMap<String, f64>) -> Self {
        Self(map)
    }
}

// ---------------------------------------------------------------------------
// ShapingHandle
// ---------------------------------------------------------------------------

/// Shared, externally writable access to a [`ShapingTable`].
///
/// Clones point at the same table. A poisoned lock is recovered rather than
/// propagated: the table holds plain numbers, so a panicking writer cannot
/// leave it structurally inconsistent.
#[derive(Debug, Clone, Default)]
pub struct ShapingHandle {
    inner: Arc<RwLock<ShapingTable>>,
}

impl ShapingHandle {
    /// Share `table`.
    pub fn new(table: ShapingTable) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, ShapingTable> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, ShapingTable> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// The current multiplier for `category`.
    pub fn multiplier(&self, category: ShapingCategory) -> f64 {
        self.read().get(category)
    }

    /// A copy of the current table.
    pub fn snapshot(&self) -> ShapingTable {
        self.read().clone()
    }

    /// Overwrite one category.
    pub fn set(&self, category: ShapingCategory, value: f64) {
        self.write().set(category, value);
    }

    /// Overwrite every key present in `other`.
    pub fn merge(&self, other: &ShapingTable) {
        self.write().merge(other);
    }
}

// ---------------------------------------------------------------------------
// Advisory interface
// ---------------------------------------------------------------------------

/// Output of a [`ShapingAdvisor`]: multipliers plus human-readable advice.
#[derive(Debug, Clone, PartialEq)]
pub struct Advisory {
    /// Multipliers to merge into the shared table.
    pub multipliers: ShapingTable,
    /// One line per piece of advice, deduplicated, in rule order.
    pub summary: Vec<String>,
}

/// Turns a free-text field report into reward-shaping multipliers.
///
/// Implementations live outside the engine; the engine only merges their
/// output into a [`ShapingHandle`].
pub trait ShapingAdvisor {
    /// Analyse `report` and return the multipliers it implies.
    fn advise(&self, report: &str) -> Advisory;
}

/// An advisor that never recommends anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NeutralAdvisor;

impl ShapingAdvisor for NeutralAdvisor {
    fn advise(&self, _report: &str) -> Advisory {
        Advisory {
            multipliers: ShapingTable::baseline(),
            summary: vec![NO_ALERTS_SUMMARY.to_owned()],
        }
    }
}

/// Merge `advisor`'s output for `report` into `handle` and return the
/// advisory summary.
pub fn apply_advisory(
    advisor: &impl ShapingAdvisor,
    report: &str,
    handle: &ShapingHandle,
) -> Vec<String> {
    let advisory = advisor.advise(report);
    handle.merge(&advisory.multipliers);
    advisory.summary
}
