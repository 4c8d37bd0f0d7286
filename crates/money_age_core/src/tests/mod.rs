//! Integration tests for the money-age engine
//!
//! Tests are organized by topic:
//! - `calculator` - Income pooling, expense routing and derived views
//! - `simulation` - Expense previews and trend forecasts
//! - `export` - Export/restore round trips and validation
//! - `rebuild` - Replaying a transaction history
//! - `analysis` - Trend classification and health distribution


use jiff::civil::{Date, date};
use tracing_subscriber::EnvFilter;

use crate::calculator::MoneyAgeCalculator;
use crate::model::Transaction;
use crate::strategy::ConsumptionStrategy;

/// Date every test calculator treats as today
pub(crate) const TODAY: Date = date(2025, 6, 1);

/// Route engine logs to the test harness; set `RUST_LOG` to see them.
pub(crate) fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub(crate) fn calculator(strategy: ConsumptionStrategy) -> MoneyAgeCalculator {
    init_test_logging();
    MoneyAgeCalculator::builder()
        .strategy(strategy)
        .today(2025, 6, 1)
        .build()
        .unwrap()
}

/// Three pools as of [`TODAY`]:
/// - `salary` 1000, 90 days old, account `checking`
/// - `bonus` 500, 30 days old, account `savings`
/// - `refund` 300, 10 days old, account `savings`
///
/// Remaining-weighted age is exactly 60 days.
pub(crate) fn seeded(strategy: ConsumptionStrategy) -> MoneyAgeCalculator {
    let mut calc = calculator(strategy);
    calc.process_income(
        &Transaction::income("salary", 1000.0, date(2025, 3, 3)),
        None,
        Some("checking".into()),
    )
    .unwrap();
    calc.process_income(
        &Transaction::income("bonus", 500.0, date(2025, 5, 2)),
        None,
        Some("savings".into()),
    )
    .unwrap();
    calc.process_income(
        &Transaction::income("refund", 300.0, date(2025, 5, 22)),
        None,
        Some("savings".into()),
    )
    .unwrap();
    calc
}

pub(crate) fn expense(id: &str, amount: f64) -> Transaction {
    Transaction::expense(id, amount, TODAY)
}

pub(crate) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
