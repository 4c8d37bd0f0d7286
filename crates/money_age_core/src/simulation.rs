//! Non-mutating previews and multi-day forecasts
//!
//! Both operate on a forked copy of the pools: the calculator's own pools
//! and consumption log are never touched, whatever the outcome.
//!
//! `simulate_expense` and `predict_trend` always draw FIFO, whatever the
//! calculator's active strategy is. `simulate_expense_with` previews under a
//! chosen strategy instead.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::calculator::MoneyAgeCalculator;
use crate::date_math::add_days;
use crate::model::{DailyMoneyAge, MoneyAgeResult, TransactionId, round_days};
use crate::strategy::ConsumptionStrategy;

/// Transaction id carried by preview results
pub const SIMULATED_EXPENSE_ID: &str = "simulated-expense";

/// Longest forecast `predict_trend` will produce (about a century)
pub const MAX_FORECAST_DAYS: u32 = 36_525;

/// Income the host expects to receive on a future date
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedIncome {
    pub date: Date,
    pub amount: f64,
}

impl ExpectedIncome {
    pub fn new(date: Date, amount: f64) -> Self {
        Self { date, amount }
    }
}

fn is_positive(amount: f64) -> bool {
    amount.is_finite() && amount > 0.0
}

impl MoneyAgeCalculator {
    /// Preview an expense of `amount` today, drawing FIFO.
    pub fn simulate_expense(&self, amount: f64) -> MoneyAgeResult {
        self.simulate_expense_with(amount, ConsumptionStrategy::Fifo)
    }

    /// Preview an expense of `amount` today under `strategy`.
    pub fn simulate_expense_with(
        &self,
        amount: f64,
        strategy: ConsumptionStrategy,
    ) -> MoneyAgeResult {
        let transaction_id = TransactionId::from(SIMULATED_EXPENSE_ID);
        let mut preview = self.pool_set().fork();

        let (total, drawn) = if is_positive(amount) {
            let drawn = preview.consume(
                &transaction_id,
                amount,
                self.today(),
                strategy.policy(),
                self.scope(),
            );
            (amount, drawn)
        } else {
            (0.0, Vec::new())
        };

        let result =
            MoneyAgeResult::from_consumptions(transaction_id, total, drawn, self.thresholds());
        trace!(
            amount,
            ?strategy,
            money_age = result.money_age,
            uncovered = result.uncovered_amount,
            "expense simulated"
        );
        result
    }

    /// Forecast the money age for each of the next `days_ahead` days.
    ///
    /// Day 1 is tomorrow. Each day first pools any `expected_incomes` dated
    /// exactly that day (tagged with the calculator's filters so expenses can
    /// reach them), then draws `estimated_daily_expense` FIFO, then records
    /// the remaining-weighted age of the simulated pools as of that day.
    /// Every call is an independent run over a fresh copy. Horizons beyond
    /// [`MAX_FORECAST_DAYS`] are cut to that many days.
    pub fn predict_trend(
        &self,
        days_ahead: u32,
        estimated_daily_expense: f64,
        expected_incomes: &[ExpectedIncome],
    ) -> Vec<DailyMoneyAge> {
        let start = self.today();
        let fifo = ConsumptionStrategy::Fifo.policy();
        let scope = self.scope();
        let mut simulated = self.pool_set().fork();

        let horizon = days_ahead.min(MAX_FORECAST_DAYS);
        let mut series = Vec::with_capacity(horizon as usize);

        for offset in 1..=horizon {
            let date = add_days(start, offset as i32);

            for income in expected_incomes
                .iter()
                .filter(|income| income.date == date && is_positive(income.amount))
            {
                simulated.add_pool(
                    TransactionId(format!("expected-income-{date}")),
                    date,
                    income.amount,
                    self.ledger_filter().cloned(),
                    self.account_filter().cloned(),
                    fifo,
                );
            }

            if is_positive(estimated_daily_expense) {
                simulated.consume(
                    &TransactionId(format!("forecast-expense-{date}")),
                    estimated_daily_expense,
                    date,
                    fifo,
                    scope,
                );
            }

            let average_age = simulated.weighted_age(date).map(round_days).unwrap_or(0);
            series.push(DailyMoneyAge {
                date,
                average_age,
                level: self.thresholds().level_for(average_age),
            });
        }

        trace!(
            days_ahead,
            estimated_daily_expense,
            incomes = expected_incomes.len(),
            "trend predicted"
        );
        series
    }
}
