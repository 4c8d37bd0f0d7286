use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, LedgerId, TransactionId};
use crate::error::{MoneyAgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Income,
    Expense,
}

/// The slice of a host transaction the engine needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub kind: TransactionType,
    /// Always positive; the direction comes from `kind`
    pub amount: f64,
    pub date: Date,
    /// Scope tags an income pool inherits unless overridden at processing time
    #[serde(default)]
    pub ledger_id: Option<LedgerId>,
    #[serde(default)]
    pub account_id: Option<AccountId>,
}

impl Transaction {
    pub fn income(id: impl Into<TransactionId>, amount: f64, date: Date) -> Self {
        Self {
            id: id.into(),
            kind: TransactionType::Income,
            amount,
            date,
            ledger_id: None,
            account_id: None,
        }
    }

    pub fn expense(id: impl Into<TransactionId>, amount: f64, date: Date) -> Self {
        Self {
            id: id.into(),
            kind: TransactionType::Expense,
            amount,
            date,
            ledger_id: None,
            account_id: None,
        }
    }

    #[must_use]
    pub fn in_ledger(mut self, ledger: impl Into<LedgerId>) -> Self {
        self.ledger_id = Some(ledger.into());
        self
    }

    #[must_use]
    pub fn in_account(mut self, account: impl Into<AccountId>) -> Self {
        self.account_id = Some(account.into());
        self
    }

    /// Check the transaction is of `expected` kind with a usable amount.
    pub(crate) fn ensure(&self, expected: TransactionType) -> Result<()> {
        if self.kind != expected {
            return Err(MoneyAgeError::WrongTransactionType {
                transaction_id: self.id.clone(),
                expected,
                found: self.kind,
            });
        }
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(MoneyAgeError::InvalidAmount {
                transaction_id: self.id.clone(),
                amount: self.amount,
            });
        }
        Ok(())
    }
}
