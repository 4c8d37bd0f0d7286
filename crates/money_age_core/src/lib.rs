//! Money-age engine
//!
//! Tracks how long money sits between being earned and being spent. Every
//! income becomes a resource pool; every expense drains pools under a
//! consumption strategy, and the amount-weighted age of the money it drew is
//! that expense's money age. It supports:
//! - FIFO, LIFO and weighted-average consumption, switchable at any time
//! - Ledger and account scoping of which pools an expense may draw from
//! - Current money age and point-in-time statistics over remaining balances
//! - Side-effect-free expense previews and multi-day forecasts
//! - Export/restore of the full state and replay of a transaction history
//!
//! # Builder DSL
//!
//! ```ignore
//! use money_age_core::{ConsumptionStrategy, MoneyAgeCalculator, Transaction};
//! use jiff::civil::date;
//!
//! let mut calculator = MoneyAgeCalculator::builder()
//!     .strategy(ConsumptionStrategy::Fifo)
//!     .today(2025, 6, 1)
//!     .build()?;
//!
//! calculator.process_income(&Transaction::income("salary", 3_000.0, date(2025, 5, 1)), None, None)?;
//! let result = calculator.process_expense(&Transaction::expense("rent", 1_200.0, date(2025, 6, 1)))?;
//! assert_eq!(result.money_age, 31);
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod calculator;
pub mod clock;
pub mod date_math;
pub mod error;
pub mod export;
pub mod rebuild;
pub mod simulation;
pub mod strategy;

mod pool_set;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::{HealthStatus, HealthSummary, LevelShare, TrendDirection, TrendSummary};
pub use calculator::MoneyAgeCalculator;
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CalculatorBuilder, CalculatorConfig};
pub use error::{MoneyAgeError, Result};
pub use export::MoneyAgeExport;
pub use model::{
    DailyMoneyAge, LevelThresholds, MoneyAge, MoneyAgeLevel, MoneyAgeResult, MoneyAgeStatistics,
    ResourceConsumption, ResourcePool, Transaction, TransactionType,
};
pub use rebuild::{RebuildSummary, RebuildWindow};
pub use simulation::ExpectedIncome;
pub use strategy::ConsumptionStrategy;
