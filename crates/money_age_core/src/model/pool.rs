//! Resource pools and the consumption records they emit
//!
//! A pool is created once per income transaction and is only ever changed by
//! [`ResourcePool::consume`]. Its age is never stored: it is derived from the
//! creation date and a caller-supplied "as of" date on every read.

use jiff::civil::Date;
use serde::{Deserialize, Serialize};

use super::ids::{AccountId, ConsumptionId, LedgerId, PoolId, TransactionId};
use super::results::AMOUNT_EPSILON;
use crate::date_math::age_in_days;

/// Income-derived bucket of money with a depletable balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourcePool {
    pub id: PoolId,
    pub income_transaction_id: TransactionId,
    pub created_at: Date,
    pub original_amount: f64,
    pub remaining_amount: f64,
    pub ledger_id: Option<LedgerId>,
    pub account_id: Option<AccountId>,

    // Consumption bookkeeping
    #[serde(default)]
    pub consumption_count: u32,
    #[serde(default)]
    pub first_consumed_on: Option<Date>,
    #[serde(default)]
    pub last_consumed_on: Option<Date>,
    /// Date the balance first reached zero
    #[serde(default)]
    pub fully_consumed_on: Option<Date>,
}

/// One draw of an expense against one pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceConsumption {
    pub id: ConsumptionId,
    pub resource_pool_id: PoolId,
    pub expense_transaction_id: TransactionId,
    pub amount: f64,
    /// Age of the pool when the draw happened; never recomputed
    pub money_age: u32,
    pub consumed_at: Date,
}

impl ResourcePool {
    pub fn new(
        id: PoolId,
        income_transaction_id: TransactionId,
        created_at: Date,
        amount: f64,
        ledger_id: Option<LedgerId>,
        account_id: Option<AccountId>,
    ) -> Self {
        Self {
            id,
            income_transaction_id,
            created_at,
            original_amount: amount,
            remaining_amount: amount,
            ledger_id,
            account_id,
            consumption_count: 0,
            first_consumed_on: None,
            last_consumed_on: None,
            fully_consumed_on: None,
        }
    }

    #[inline]
    pub fn has_remaining(&self) -> bool {
        self.remaining_amount > 0.0
    }

    /// Balance below which a pool counts as drained after a draw
    fn dust_tolerance(&self) -> f64 {
        AMOUNT_EPSILON * self.original_amount.max(1.0)
    }

    pub fn consumed_amount(&self) -> f64 {
        self.original_amount - self.remaining_amount
    }

    pub fn age_in_days(&self, as_of: Date) -> u32 {
        age_in_days(self.created_at, as_of)
    }

    /// Whether the pool falls inside an optional ledger/account scope.
    pub fn in_scope(&self, ledger: Option<&LedgerId>, account: Option<&AccountId>) -> bool {
        ledger.is_none_or(|l| self.ledger_id.as_ref() == Some(l))
            && account.is_none_or(|a| self.account_id.as_ref() == Some(a))
    }

    /// Draw up to `amount` from the pool.
    ///
    /// The draw is capped at the remaining balance, and a draw that would
    /// leave only rounding residue takes the whole balance. Returns `None` when
    /// nothing could be taken (depleted pool or non-positive request), so
    /// every emitted consumption has a positive amount.
    pub fn consume(
        &mut self,
        amount: f64,
        expense_transaction_id: &TransactionId,
        consumption_id: ConsumptionId,
        as_of: Date,
    ) -> Option<ResourceConsumption> {
        let mut taken = amount.min(self.remaining_amount);
        if taken.is_nan() || taken <= 0.0 {
            return None;
        }
        // Proportional draws can fall short of the balance by rounding error
        if self.remaining_amount - taken <= self.dust_tolerance() {
            taken = self.remaining_amount;
        }

        self.remaining_amount -= taken;

        self.consumption_count += 1;
        self.first_consumed_on.get_or_insert(as_of);
        self.last_consumed_on = Some(as_of);
        if !self.has_remaining() && self.fully_consumed_on.is_none() {
            self.fully_consumed_on = Some(as_of);
        }

        Some(ResourceConsumption {
            id: consumption_id,
            resource_pool_id: self.id,
            expense_transaction_id: expense_transaction_id.clone(),
            amount: taken,
            money_age: self.age_in_days(as_of),
            consumed_at: as_of,
        })
    }
}
