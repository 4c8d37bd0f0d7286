//! Replay a transaction history into a fresh ledger
//!
//! Rebuilding clears the calculator and feeds the history back in date
//! order. Unlike `process_expense`, which reads pool ages against today,
//! replayed expenses read ages against their own date, so the rebuilt
//! consumption log matches what live processing would have recorded.
//! Income pools keep the ledger/account tags carried on their transaction.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calculator::MoneyAgeCalculator;
use crate::error::Result;
use crate::model::{AMOUNT_EPSILON, Transaction, TransactionType};

/// Inclusive date range a rebuild is limited to; open ends are unbounded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildWindow {
    pub start: Option<Date>,
    pub end: Option<Date>,
}

impl RebuildWindow {
    pub fn new(start: Option<Date>, end: Option<Date>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, date: Date) -> bool {
        self.start.is_none_or(|start| date >= start) && self.end.is_none_or(|end| date <= end)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RebuildSummary {
    pub incomes_processed: usize,
    pub expenses_processed: usize,
    /// Expenses that could not be fully covered by earlier income
    pub underfunded_expenses: usize,
    pub uncovered_total: f64,
    /// Transactions dated outside the window
    pub skipped: usize,
}

impl MoneyAgeCalculator {
    /// Clear state and replay all of `transactions`.
    pub fn rebuild(&mut self, transactions: &[Transaction]) -> Result<RebuildSummary> {
        self.rebuild_within(transactions, RebuildWindow::default())
    }

    /// Clear state and replay the transactions dated inside `window`.
    ///
    /// Transactions are ordered by date, incomes before expenses on the same
    /// day, otherwise keeping input order. Replayed transactions are
    /// validated before anything is cleared, so a bad entry leaves state
    /// untouched.
    pub fn rebuild_within(
        &mut self,
        transactions: &[Transaction],
        window: RebuildWindow,
    ) -> Result<RebuildSummary> {
        let mut ordered: Vec<&Transaction> = transactions
            .iter()
            .filter(|tx| window.contains(tx.date))
            .collect();
        for tx in &ordered {
            tx.ensure(tx.kind)?;
        }
        ordered.sort_by_key(|tx| (tx.date, tx.kind == TransactionType::Expense));

        self.clear();
        let mut summary = RebuildSummary {
            skipped: transactions.len() - ordered.len(),
            ..RebuildSummary::default()
        };

        for tx in ordered {
            match tx.kind {
                TransactionType::Income => {
                    self.process_income(tx, None, None)?;
                    summary.incomes_processed += 1;
                }
                TransactionType::Expense => {
                    let result = self.apply_expense(tx, tx.date)?;
                    summary.expenses_processed += 1;
                    if result.uncovered_amount > AMOUNT_EPSILON {
                        summary.underfunded_expenses += 1;
                        summary.uncovered_total += result.uncovered_amount;
                    }
                }
            }
        }

        info!(
            incomes = summary.incomes_processed,
            expenses = summary.expenses_processed,
            underfunded = summary.underfunded_expenses,
            skipped = summary.skipped,
            "money age ledger rebuilt"
        );
        Ok(summary)
    }
}
