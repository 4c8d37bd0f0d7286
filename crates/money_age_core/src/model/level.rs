//! Health levels derived from a money age in days

use serde::{Deserialize, Serialize};

use crate::error::{MoneyAgeError, Result};

/// Coarse health bucket for a money age, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoneyAgeLevel {
    Danger,
    Warning,
    Normal,
    Good,
    Excellent,
    Ideal,
}

impl MoneyAgeLevel {
    pub const ALL: [MoneyAgeLevel; 6] = [
        MoneyAgeLevel::Danger,
        MoneyAgeLevel::Warning,
        MoneyAgeLevel::Normal,
        MoneyAgeLevel::Good,
        MoneyAgeLevel::Excellent,
        MoneyAgeLevel::Ideal,
    ];

    /// Level under the default thresholds
    pub fn from_days(days: u32) -> Self {
        LevelThresholds::default().level_for(days)
    }
}

/// Lower bounds (in days) at which each level above `Danger` begins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelThresholds {
    pub warning: u32,
    pub normal: u32,
    pub good: u32,
    pub excellent: u32,
    pub ideal: u32,
}

impl Default for LevelThresholds {
    fn default() -> Self {
        Self {
            warning: 7,
            normal: 14,
            good: 30,
            excellent: 60,
            ideal: 90,
        }
    }
}

impl LevelThresholds {
    pub fn level_for(&self, days: u32) -> MoneyAgeLevel {
        if days < self.warning {
            MoneyAgeLevel::Danger
        } else if days < self.normal {
            MoneyAgeLevel::Warning
        } else if days < self.good {
            MoneyAgeLevel::Normal
        } else if days < self.excellent {
            MoneyAgeLevel::Good
        } else if days < self.ideal {
            MoneyAgeLevel::Excellent
        } else {
            MoneyAgeLevel::Ideal
        }
    }

    /// Thresholds must be strictly ascending, otherwise some level is unreachable.
    pub fn validate(&self) -> Result<()> {
        let bounds = [
            self.warning,
            self.normal,
            self.good,
            self.excellent,
            self.ideal,
        ];
        if bounds.windows(2).all(|w| w[0] < w[1]) {
            Ok(())
        } else {
            Err(MoneyAgeError::InvalidConfig(format!(
                "level thresholds must be strictly ascending, got {bounds:?}"
            )))
        }
    }
}
