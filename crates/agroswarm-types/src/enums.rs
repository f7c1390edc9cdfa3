//! Enumeration types for the AgroSwarm simulation.
//!
//! Crops, agent actions, reward-shaping categories, and the field conditions
//! an operator can toggle. Every enum here is closed: handlers match on
//! them exhaustively, so adding a variant is a compile-time event.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Crops
// ---------------------------------------------------------------------------

/// A crop that can occupy a field cell. A cell without a crop is fallow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    /// Winter wheat.
    Wheat,
    /// Field corn.
    Corn,
    /// Soybean.
    Soy,
}

impl CropType {
    /// Every crop type, in canonical order.
    pub const ALL: [Self; 3] = [Self::Wheat, Self::Corn, Self::Soy];

    /// Number of distinct crop types.
    pub const COUNT: usize = Self::ALL.len();

    /// Market value weight applied to a successful harvest.
    pub const fn value_weight(self) -> f64 {
        match self {
            Self::Wheat => 1.0,
            Self::Corn => 1.3,
            Self::Soy => 1.1,
        }
    }

    /// Position of this crop inside [`CropType::ALL`].
    pub const fn index(self) -> usize {
        match self {
            Self::Wheat => 0,
            Self::Corn => 1,
            Self::Soy => 2,
        }
    }

    /// Canonical lowercase name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wheat => "wheat",
            Self::Corn => "corn",
            Self::Soy => "soy",
        }
    }
}

impl fmt::Display for CropType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// An intervention an agent performs on the cell it stands on.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Do nothing this turn.
    #[default]
    Idle,
    /// Scout the cell. No state change beyond the monitoring counter.
    Monitor,
    /// Add water to the cell.
    Irrigate,
    /// Treat the cell against pests.
    ApplyPesticide,
    /// Treat the cell against disease.
    ApplyFungicide,
    /// Add nutrients to the cell.
    Fertilize,
    /// Harvest a mature, healthy crop.
    Harvest,
}

impl ActionKind {
    /// Every action, in canonical order.
    pub const ALL: [Self; 7] = [
        Self::Idle,
        Self::Monitor,
        Self::Irrigate,
        Self::ApplyPesticide,
        Self::ApplyFungicide,
        Self::Fertilize,
        Self::Harvest,
    ];

    /// Canonical snake-case name, matching the serde representation.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Monitor => "monitor",
            Self::Irrigate => "irrigate",
            Self::ApplyPesticide => "apply_pesticide",
            Self::ApplyFungicide => "apply_fungicide",
            Self::Fertilize => "fertilize",
            Self::Harvest => "harvest",
        }
    }

    /// The reward-shaping category whose multiplier scales this action's
    /// reward, if any. Idle and harvest are never shaped.
    pub const fn shaping_category(self) -> Option<ShapingCategory> {
        match self {
            Self::Idle | Self::Harvest => None,
            Self::Monitor => Some(ShapingCategory::Monitor),
            Self::Irrigate => Some(ShapingCategory::Irrigate),
            Self::ApplyPesticide => Some(ShapingCategory::Pesticide),
            Self::ApplyFungicide => Some(ShapingCategory::Fungicide),
            Self::Fertilize => Some(ShapingCategory::Fertilize),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name one of the seven actions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown action: {0:?}")]
pub struct ParseActionError(pub String);

impl FromStr for ActionKind {
    type Err = ParseActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ParseActionError(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Reward shaping
// ---------------------------------------------------------------------------

/// A reward-shaping category. Each maps to one key in the externally
/// supplied multiplier table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum ShapingCategory {
    /// Scales irrigation rewards.
    Irrigate,
    /// Scales pesticide rewards.
    Pesticide,
    /// Scales fungicide rewards.
    Fungicide,
    /// Scales monitoring rewards.
    Monitor,
    /// Scales fertilization rewards.
    Fertilize,
}

impl ShapingCategory {
    /// Every shaping category, in canonical order.
    pub const ALL: [Self; 5] = [
        Self::Irrigate,
        Self::Pesticide,
        Self::Fungicide,
        Self::Monitor,
        Self::Fertilize,
    ];

    /// Key under which the multiplier is stored in the shaping table.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Irrigate => "irrigate_multiplier",
            Self::Pesticide => "pesticide_multiplier",
            Self::Fungicide => "fungicide_multiplier",
            Self::Monitor => "monitor_multiplier",
            Self::Fertilize => "fertilize_multiplier",
        }
    }
}

// ---------------------------------------------------------------------------
// Field conditions
// ---------------------------------------------------------------------------

/// An operator-toggled field condition that overrides weather and nudges
/// reward shaping while active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum FieldCondition {
    /// Sustained rain, high humidity, mild temperature.
    Rainy,
    /// Clear sky, dry air, hot.
    Sunny,
    /// Strong variable wind.
    WindStorm,
    /// No rain, very dry, very hot.
    Drought,
}

impl FieldCondition {
    /// Every condition, in canonical order.
    pub const ALL: [Self; 4] = [Self::Rainy, Self::Sunny, Self::WindStorm, Self::Drought];

    /// The condition that cannot be active at the same time as this one.
    pub const fn exclusive_with(self) -> Option<Self> {
        match self {
            Self::Rainy => Some(Self::Sunny),
            Self::Sunny => Some(Self::Rainy),
            Self::WindStorm | Self::Drought => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn action_names_round_trip_through_from_str() {
        for kind in ActionKind::ALL {
            assert_eq!(kind.as_str().parse::<ActionKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_action_name_is_rejected() {
        let err = "plough".parse::<ActionKind>().unwrap_err();
        assert_eq!(err, ParseActionError("plough".to_owned()));
    }

    #[test]
    fn action_serde_matches_canonical_name() {
        let json = serde_json::to_string(&ActionKind::ApplyFungicide).unwrap();
        assert_eq!(json, "\"apply_fungicide\"");
    }

    #[test]
    fn idle_and_harvest_are_unshaped() {
        assert_eq!(ActionKind::Idle.shaping_category(), None);
        assert_eq!(ActionKind::Harvest.shaping_category(), None);
        assert_eq!(
            ActionKind::Irrigate.shaping_category(),
            Some(ShapingCategory::Irrigate)
        );
    }

    #[test]
    fn crop_indices_match_all_order() {
        for (i, crop) in CropType::ALL.into_iter().enumerate() {
            assert_eq!(crop.index(), i);
        }
    }

    #[test]
    fn corn_is_the_most_valuable_crop() {
        assert!(CropType::Corn.value_weight() > CropType::Soy.value_weight());
        assert!(CropType::Soy.value_weight() > CropType::Wheat.value_weight());
    }

    #[test]
    fn rainy_and_sunny_exclude_each_other() {
        assert_eq!(FieldCondition::Rainy.exclusive_with(), Some(FieldCondition::Sunny));
        assert_eq!(FieldCondition::Sunny.exclusive_with(), Some(FieldCondition::Rainy));
        assert_eq!(FieldCondition::Drought.exclusive_with(), None);
    }
}
