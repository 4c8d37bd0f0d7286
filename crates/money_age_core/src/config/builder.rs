//! Calculator Builder
//!
//! Fluent construction of a [`MoneyAgeCalculator`] with validation at the end.
//!
//! ```ignore
//! use money_age_core::clock::FixedClock;
//! use money_age_core::config::CalculatorBuilder;
//! use money_age_core::strategy::ConsumptionStrategy;
//!
//! let calculator = CalculatorBuilder::new()
//!     .strategy(ConsumptionStrategy::WeightedAverage)
//!     .account_filter("checking")
//!     .clock(FixedClock(jiff::civil::date(2025, 6, 1)))
//!     .build()?;
//! ```

use std::sync::Arc;

use super::CalculatorConfig;
use crate::calculator::MoneyAgeCalculator;
use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::model::{AccountId, LedgerId, LevelThresholds};
use crate::strategy::ConsumptionStrategy;

pub struct CalculatorBuilder {
    config: CalculatorConfig,
    clock: Arc<dyn Clock>,
}

impl Default for CalculatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CalculatorBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: CalculatorConfig::default(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Start from an existing configuration (e.g. loaded from JSON)
    #[must_use]
    pub fn from_config(config: CalculatorConfig) -> Self {
        Self {
            config,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn strategy(mut self, strategy: ConsumptionStrategy) -> Self {
        self.config.strategy = strategy;
        self
    }

    #[must_use]
    pub fn ledger_filter(mut self, ledger: impl Into<LedgerId>) -> Self {
        self.config.ledger_filter = Some(ledger.into());
        self
    }

    #[must_use]
    pub fn account_filter(mut self, account: impl Into<AccountId>) -> Self {
        self.config.account_filter = Some(account.into());
        self
    }

    #[must_use]
    pub fn thresholds(mut self, thresholds: LevelThresholds) -> Self {
        self.config.thresholds = thresholds;
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Pin "today" to a fixed date
    #[must_use]
    pub fn today(self, year: i16, month: i8, day: i8) -> Self {
        self.clock(crate::clock::FixedClock(jiff::civil::date(year, month, day)))
    }

    pub fn build(self) -> Result<MoneyAgeCalculator> {
        self.config.validate()?;
        Ok(MoneyAgeCalculator::with_parts(self.config, self.clock))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MoneyAgeError;

    #[test]
    fn test_builder_sets_policy() {
        let calculator = CalculatorBuilder::new()
            .strategy(ConsumptionStrategy::Lifo)
            .ledger_filter("home")
            .account_filter("wallet")
            .today(2025, 6, 1)
            .build()
            .unwrap();

        assert_eq!(calculator.strategy(), ConsumptionStrategy::Lifo);
        assert_eq!(calculator.ledger_filter(), Some(&LedgerId::from("home")));
        assert_eq!(calculator.account_filter(), Some(&AccountId::from("wallet")));
        assert_eq!(calculator.today(), jiff::civil::date(2025, 6, 1));
    }

    #[test]
    fn test_builder_rejects_bad_thresholds() {
        let result = CalculatorBuilder::new()
            .thresholds(LevelThresholds {
                ideal: 10,
                ..LevelThresholds::default()
            })
            .build();
        assert!(matches!(result, Err(MoneyAgeError::InvalidConfig(_))));
    }
}
