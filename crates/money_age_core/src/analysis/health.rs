//! Distribution of processed expenses over the health levels, and the
//! overall status derived from it

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::calculator::MoneyAgeCalculator;
use crate::model::{
    MoneyAgeLevel, ResourceConsumption, TransactionId, round_days, weighted_consumption_age,
};

/// Expenses whose weighted age fell into one level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LevelShare {
    pub level: MoneyAgeLevel,
    pub count: usize,
    /// Share of all expenses in the log, 0..=100
    pub percentage: f64,
    /// Total amount drawn by these expenses
    pub total_amount: f64,
    /// Mean of the expenses' weighted ages, 0 when `count` is 0
    pub average_age: f64,
}

/// Share of expenses (percent) a bad level must exceed to set the overall status
const OVERALL_SHARE_LIMIT: f64 = 30.0;

/// Overall verdict on how old the money behind past expenses was
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSummary {
    pub status: HealthStatus,
    pub shares: Vec<LevelShare>,
}

impl HealthSummary {
    /// Danger if more than 30% of expenses were in danger, else warning if
    /// more than 30% were in warning, else healthy.
    pub fn from_shares(shares: Vec<LevelShare>) -> Self {
        let percentage = |level: MoneyAgeLevel| {
            shares
                .iter()
                .find(|s| s.level == level)
                .map_or(0.0, |s| s.percentage)
        };

        let status = if percentage(MoneyAgeLevel::Danger) > OVERALL_SHARE_LIMIT {
            HealthStatus::Danger
        } else if percentage(MoneyAgeLevel::Warning) > OVERALL_SHARE_LIMIT {
            HealthStatus::Warning
        } else {
            HealthStatus::Healthy
        };

        Self { status, shares }
    }
}

impl MoneyAgeCalculator {
    pub fn health_summary(&self) -> HealthSummary {
        HealthSummary::from_shares(self.health_distribution())
    }


    /// One entry per level, worst first, built from the consumption log.
    ///
    /// Expenses that drew nothing leave no consumptions and are not counted.
    pub fn health_distribution(&self) -> Vec<LevelShare> {
        let mut by_expense: FxHashMap<&TransactionId, Vec<ResourceConsumption>> =
            FxHashMap::default();
        for consumption in self.consumptions() {
            by_expense
                .entry(&consumption.expense_transaction_id)
                .or_default()
                .push(consumption.clone());
        }

        let mut shares: Vec<LevelShare> = MoneyAgeLevel::ALL
            .iter()
            .map(|&level| LevelShare {
                level,
                count: 0,
                percentage: 0.0,
                total_amount: 0.0,
                average_age: 0.0,
            })
            .collect();

        let expenses = by_expense.len();
        for draws in by_expense.values() {
            let Some(age) = weighted_consumption_age(draws) else {
                continue;
            };
            let level = self.thresholds().level_for(round_days(age));
            let Some(share) = shares.iter_mut().find(|s| s.level == level) else {
                continue;
            };
            share.count += 1;
            share.total_amount += draws.iter().map(|c| c.amount).sum::<f64>();
            share.average_age += age;
        }

        for share in &mut shares {
            if share.count > 0 {
                share.average_age /= share.count as f64;
                share.percentage = share.count as f64 / expenses as f64 * 100.0;
            }
        }
        shares
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Transaction;
    use jiff::civil::date;

    fn shares(danger: f64, warning: f64) -> Vec<LevelShare> {
        MoneyAgeLevel::ALL
            .iter()
            .map(|&level| LevelShare {
                level,
                count: 0,
                percentage: match level {
                    MoneyAgeLevel::Danger => danger,
                    MoneyAgeLevel::Warning => warning,
                    MoneyAgeLevel::Good => 100.0 - danger - warning,
                    _ => 0.0,
                },
                total_amount: 0.0,
                average_age: 0.0,
            })
            .collect()
    }

    #[test]
    fn test_overall_status_boundaries() {
        let status = |danger, warning| HealthSummary::from_shares(shares(danger, warning)).status;

        assert_eq!(status(30.0, 0.0), HealthStatus::Healthy);
        assert_eq!(status(30.5, 0.0), HealthStatus::Danger);
        assert_eq!(status(0.0, 30.0), HealthStatus::Healthy);
        assert_eq!(status(0.0, 30.5), HealthStatus::Warning);
        // Danger wins when both exceed the limit
        assert_eq!(status(35.0, 40.0), HealthStatus::Danger);
        assert_eq!(status(0.0, 0.0), HealthStatus::Healthy);
    }

    #[test]
    fn test_health_summary_from_log() {
        let mut calculator = MoneyAgeCalculator::builder()
            .today(2025, 6, 1)
            .build()
            .unwrap();
        calculator
            .process_income(&Transaction::income("fresh", 100.0, date(2025, 5, 30)), None, None)
            .unwrap();
        calculator
            .process_expense(&Transaction::expense("e1", 10.0, date(2025, 6, 1)))
            .unwrap();

        let summary = calculator.health_summary();
        assert_eq!(summary.status, HealthStatus::Danger);
        assert_eq!(summary.shares.len(), MoneyAgeLevel::ALL.len());

        let empty = MoneyAgeCalculator::builder()
            .today(2025, 6, 1)
            .build()
            .unwrap();
        assert_eq!(empty.health_summary().status, HealthStatus::Healthy);
    }

    #[test]
    fn test_empty_log_reports_every_level() {
        let calculator = MoneyAgeCalculator::builder()
            .today(2025, 6, 1)
            .build()
            .unwrap();
        let shares = calculator.health_distribution();
        assert_eq!(shares.len(), MoneyAgeLevel::ALL.len());
        assert!(shares.iter().all(|s| s.count == 0 && s.percentage == 0.0));
    }

    #[test]
    fn test_expenses_grouped_by_level() {
        let mut calculator = MoneyAgeCalculator::builder()
            .today(2025, 6, 1)
            .build()
            .unwrap();
        calculator
            .process_income(&Transaction::income("old", 100.0, date(2025, 3, 1)), None, None)
            .unwrap();
        calculator
            .process_income(&Transaction::income("new", 100.0, date(2025, 5, 30)), None, None)
            .unwrap();

        // 92 days old -> ideal
        calculator
            .process_expense(&Transaction::expense("e1", 60.0, date(2025, 6, 1)))
            .unwrap();
        // 40 from the old pool (92 days) + 40 from the new pool (2 days) -> 47 days, good
        calculator
            .process_expense(&Transaction::expense("e2", 80.0, date(2025, 6, 1)))
            .unwrap();

        let shares = calculator.health_distribution();
        let ideal = shares.iter().find(|s| s.level == MoneyAgeLevel::Ideal).unwrap();
        let good = shares.iter().find(|s| s.level == MoneyAgeLevel::Good).unwrap();

        assert_eq!(ideal.count, 1);
        assert_eq!(ideal.total_amount, 60.0);
        assert_eq!(ideal.average_age, 92.0);
        assert_eq!(ideal.percentage, 50.0);
        assert_eq!(good.count, 1);
        assert_eq!(good.total_amount, 80.0);
        assert!((good.average_age - 47.0).abs() < 1e-9);
    }
}
