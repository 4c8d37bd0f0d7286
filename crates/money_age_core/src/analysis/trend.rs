//! Trend classification over a `DailyMoneyAge` series

use serde::{Deserialize, Serialize};

use crate::model::DailyMoneyAge;

/// Relative change between first and last point beyond which a trend moves
const TREND_BAND: f64 = 0.10;

/// Older money is healthier, so a rising age is an improving trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Improving,
    Stable,
    Declining,
}

impl TrendDirection {
    /// Classify the move from `first` to `last`.
    pub fn between(first: u32, last: u32) -> Self {
        if first == 0 {
            return if last > 0 { Self::Improving } else { Self::Stable };
        }
        let change = (f64::from(last) - f64::from(first)) / f64::from(first);
        if change > TREND_BAND {
            Self::Improving
        } else if change < -TREND_BAND {
            Self::Declining
        } else {
            Self::Stable
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub direction: TrendDirection,
    pub mean_age: f64,
    pub min_age: u32,
    pub max_age: u32,
    pub days: usize,
}

impl TrendSummary {
    /// Summarize a series; fewer than two points is always stable.
    pub fn from_series(series: &[DailyMoneyAge]) -> Self {
        let direction = match (series.first(), series.last()) {
            (Some(first), Some(last)) if series.len() >= 2 => {
                TrendDirection::between(first.average_age, last.average_age)
            }
            _ => TrendDirection::Stable,
        };

        let ages = series.iter().map(|d| d.average_age);
        let mean_age = if series.is_empty() {
            0.0
        } else {
            ages.clone().map(f64::from).sum::<f64>() / series.len() as f64
        };

        Self {
            direction,
            mean_age,
            min_age: ages.clone().min().unwrap_or(0),
            max_age: ages.max().unwrap_or(0),
            days: series.len(),
        }
    }
}
