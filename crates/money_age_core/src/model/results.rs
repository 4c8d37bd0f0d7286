//! Output types handed to reporting layers

use jiff::civil::Date;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, TransactionId};
use super::level::{LevelThresholds, MoneyAgeLevel};
use super::pool::ResourceConsumption;

/// Uncovered remainders below this are float noise from proration
pub const AMOUNT_EPSILON: f64 = 1e-9;

/// Outcome of routing one expense through the pools
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyAgeResult {
    pub transaction_id: TransactionId,
    /// Amount-weighted age of the draws, rounded to whole days
    pub money_age: u32,
    pub level: MoneyAgeLevel,
    pub consumptions: Vec<ResourceConsumption>,
    pub total_amount: f64,
    pub covered_amount: f64,
    pub uncovered_amount: f64,
}

impl MoneyAgeResult {
    pub fn from_consumptions(
        transaction_id: TransactionId,
        total_amount: f64,
        consumptions: Vec<ResourceConsumption>,
        thresholds: &LevelThresholds,
    ) -> Self {
        let covered_amount: f64 = consumptions.iter().map(|c| c.amount).sum();
        let mut uncovered_amount = (total_amount - covered_amount).max(0.0);
        if uncovered_amount < AMOUNT_EPSILON {
            uncovered_amount = 0.0;
        }
        let money_age = weighted_consumption_age(&consumptions)
            .map(round_days)
            .unwrap_or(0);

        Self {
            transaction_id,
            money_age,
            level: thresholds.level_for(money_age),
            consumptions,
            total_amount,
            covered_amount,
            uncovered_amount,
        }
    }

    pub fn is_fully_covered(&self) -> bool {
        self.uncovered_amount == 0.0
    }
}

/// Amount-weighted mean of the snapshotted ages, `None` if nothing was drawn.
pub fn weighted_consumption_age(consumptions: &[ResourceConsumption]) -> Option<f64> {
    let (weighted, total) = consumptions.iter().fold((0.0, 0.0), |(w, t), c| {
        (w + c.amount * f64::from(c.money_age), t + c.amount)
    });
    (total > 0.0).then(|| weighted / total)
}

/// Round a fractional day count to whole days.
pub(crate) fn round_days(days: f64) -> u32 {
    days.max(0.0).round() as u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyAge {
    pub days: u32,
    pub level: MoneyAgeLevel,
}

/// Point-in-time aggregation over pools that still hold money
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyAgeStatistics {
    /// Remaining-weighted average age in days (unrounded)
    pub average_age: f64,
    pub level: MoneyAgeLevel,
    /// Always empty: pools carry no category
    pub age_by_category: FxHashMap<String, f64>,
    pub age_by_account: FxHashMap<AccountId, f64>,
    pub total_resource_pool_balance: f64,
    pub active_pool_count: usize,
    pub total_pool_count: usize,
    pub min_age: Option<u32>,
    pub max_age: Option<u32>,
    pub median_age: Option<f64>,
    pub calculated_at: Date,
}

/// One forecast day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyMoneyAge {
    pub date: Date,
    pub average_age: u32,
    pub level: MoneyAgeLevel,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ConsumptionId, PoolId};

    fn draw(amount: f64, age: u32) -> ResourceConsumption {
        ResourceConsumption {
            id: ConsumptionId(0),
            resource_pool_id: PoolId(0),
            expense_transaction_id: TransactionId::from("e"),
            amount,
            money_age: age,
            consumed_at: jiff::civil::date(2025, 1, 1),
        }
    }

    #[test]
    fn test_weighted_age_rounds_to_nearest_day() {
        // (100 * 10 + 300 * 5) / 400 = 6.25
        let result = MoneyAgeResult::from_consumptions(
            TransactionId::from("e"),
            400.0,
            vec![draw(100.0, 10), draw(300.0, 5)],
            &LevelThresholds::default(),
        );
        assert_eq!(result.money_age, 6);
        assert_eq!(result.level, MoneyAgeLevel::Danger);
        assert!(result.is_fully_covered());

        // (1 * 10 + 1 * 5) / 2 = 7.5 -> 8
        let result = MoneyAgeResult::from_consumptions(
            TransactionId::from("e"),
            2.0,
            vec![draw(1.0, 10), draw(1.0, 5)],
            &LevelThresholds::default(),
        );
        assert_eq!(result.money_age, 8);
    }

    #[test]
    fn test_empty_result() {
        let result = MoneyAgeResult::from_consumptions(
            TransactionId::from("e"),
            250.0,
            Vec::new(),
            &LevelThresholds::default(),
        );
        assert_eq!(result.money_age, 0);
        assert_eq!(result.covered_amount, 0.0);
        assert_eq!(result.uncovered_amount, 250.0);
        assert!(!result.is_fully_covered());
    }

    #[test]
    fn test_uncovered_noise_is_snapped() {
        let result = MoneyAgeResult::from_consumptions(
            TransactionId::from("e"),
            0.3,
            vec![draw(0.1, 1), draw(0.2, 1)],
            &LevelThresholds::default(),
        );
        assert_eq!(result.uncovered_amount, 0.0);
    }
}
