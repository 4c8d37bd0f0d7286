//! The money-age calculator
//!
//! [`MoneyAgeCalculator`] exclusively owns the pools and the consumption log.
//! Incomes become pools, expenses are routed through the active strategy,
//! and everything else (current age, statistics, previews, forecasts) is
//! derived from that state on demand.
//!
//! Every mutating call takes `&mut self`. Hosts that share a calculator
//! between threads or tasks must serialize access themselves, e.g. behind a
//! `Mutex` or inside a single owning task.

use std::sync::Arc;

use jiff::civil::Date;
use rustc_hash::FxHashMap;
use tracing::{debug, info};

use crate::clock::{Clock, SystemClock};
use crate::config::{CalculatorBuilder, CalculatorConfig};
use crate::error::Result;
use crate::model::{
    AccountId, LedgerId, LevelThresholds, MoneyAge, MoneyAgeResult, MoneyAgeStatistics, PoolId,
    ResourceConsumption, ResourcePool, Transaction, TransactionId, TransactionType, round_days,
};
use crate::pool_set::{PoolSet, Scope};
use crate::strategy::ConsumptionStrategy;

#[derive(Debug, Clone)]
pub struct MoneyAgeCalculator {
    config: CalculatorConfig,
    clock: Arc<dyn Clock>,
    ledger: PoolSet,
}

impl Default for MoneyAgeCalculator {
    fn default() -> Self {
        Self::new()
    }
}

impl MoneyAgeCalculator {
    /// FIFO calculator reading ages against the system clock
    pub fn new() -> Self {
        Self::with_parts(CalculatorConfig::default(), Arc::new(SystemClock))
    }

    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self::with_parts(CalculatorConfig::default(), Arc::new(clock))
    }

    pub fn builder() -> CalculatorBuilder {
        CalculatorBuilder::new()
    }

    pub(crate) fn with_parts(config: CalculatorConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            ledger: PoolSet::default(),
        }
    }

    // =========================================================================
    // Policy
    // =========================================================================

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    pub fn strategy(&self) -> ConsumptionStrategy {
        self.config.strategy
    }

    /// Switch strategy for subsequent expenses; past consumptions are untouched.
    pub fn set_strategy(&mut self, strategy: ConsumptionStrategy) {
        self.config.strategy = strategy;
        self.ledger.reorder(strategy.policy());
    }

    pub fn ledger_filter(&self) -> Option<&LedgerId> {
        self.config.ledger_filter.as_ref()
    }

    pub fn set_ledger_filter(&mut self, ledger: Option<LedgerId>) {
        self.config.ledger_filter = ledger;
    }

    pub fn account_filter(&self) -> Option<&AccountId> {
        self.config.account_filter.as_ref()
    }

    pub fn set_account_filter(&mut self, account: Option<AccountId>) {
        self.config.account_filter = account;
    }

    pub fn thresholds(&self) -> &LevelThresholds {
        &self.config.thresholds
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    pub(crate) fn scope(&self) -> Scope<'_> {
        Scope {
            ledger: self.config.ledger_filter.as_ref(),
            account: self.config.account_filter.as_ref(),
        }
    }

    pub(crate) fn pool_set(&self) -> &PoolSet {
        &self.ledger
    }

    pub(crate) fn replace_pool_set(&mut self, ledger: PoolSet) {
        self.ledger = ledger;
    }

    // =========================================================================
    // Read-only views
    // =========================================================================

    /// Pools in the active strategy's natural order, depleted ones included
    pub fn pools(&self) -> &[ResourcePool] {
        self.ledger.pools()
    }

    /// The append-only consumption log, oldest first
    pub fn consumptions(&self) -> &[ResourceConsumption] {
        self.ledger.consumptions()
    }

    pub fn pool(&self, id: PoolId) -> Option<&ResourcePool> {
        self.ledger.get(id)
    }

    pub fn consumptions_for_expense<'a>(
        &'a self,
        expense: &TransactionId,
    ) -> impl Iterator<Item = &'a ResourceConsumption> + use<'a> {
        let expense = expense.clone();
        self.consumptions()
            .iter()
            .filter(move |c| c.expense_transaction_id == expense)
    }

    pub fn consumptions_for_pool(
        &self,
        pool: PoolId,
    ) -> impl Iterator<Item = &ResourceConsumption> + '_ {
        self.consumptions()
            .iter()
            .filter(move |c| c.resource_pool_id == pool)
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Turn an income transaction into a new pool.
    ///
    /// `ledger_id`/`account_id` tag the pool; when `None`, the transaction's
    /// own tags are used.
    pub fn process_income(
        &mut self,
        tx: &Transaction,
        ledger_id: Option<LedgerId>,
        account_id: Option<AccountId>,
    ) -> Result<ResourcePool> {
        tx.ensure(TransactionType::Income)?;

        let pool = self.ledger.add_pool(
            tx.id.clone(),
            tx.date,
            tx.amount,
            ledger_id.or_else(|| tx.ledger_id.clone()),
            account_id.or_else(|| tx.account_id.clone()),
            self.config.strategy.policy(),
        );
        debug!(pool = %pool.id, transaction = %tx.id, amount = tx.amount, "income pooled");
        Ok(pool)
    }

    /// Pool every income in `txs`; anything else is skipped.
    pub fn process_incomes(&mut self, txs: &[Transaction]) -> Vec<ResourcePool> {
        txs.iter()
            .filter(|tx| tx.kind == TransactionType::Income)
            .filter_map(|tx| match self.process_income(tx, None, None) {
                Ok(pool) => Some(pool),
                Err(err) => {
                    debug!(transaction = %tx.id, %err, "income skipped");
                    None
                }
            })
            .collect()
    }

    /// Draw an expense from the pools under the active strategy.
    ///
    /// Running out of pool balance is not an error; the shortfall is
    /// reported as `uncovered_amount`.
    pub fn process_expense(&mut self, tx: &Transaction) -> Result<MoneyAgeResult> {
        let today = self.today();
        self.apply_expense(tx, today)
    }

    /// Draw an expense with pool ages evaluated on `as_of`.
    pub(crate) fn apply_expense(&mut self, tx: &Transaction, as_of: Date) -> Result<MoneyAgeResult> {
        tx.ensure(TransactionType::Expense)?;

        let policy = self.config.strategy.policy();
        let scope = Scope {
            ledger: self.config.ledger_filter.as_ref(),
            account: self.config.account_filter.as_ref(),
        };
        let drawn = self.ledger.consume(&tx.id, tx.amount, as_of, policy, scope);
        let result = MoneyAgeResult::from_consumptions(
            tx.id.clone(),
            tx.amount,
            drawn,
            &self.config.thresholds,
        );

        debug!(
            transaction = %tx.id,
            strategy = ?self.config.strategy,
            money_age = result.money_age,
            covered = result.covered_amount,
            uncovered = result.uncovered_amount,
            "expense processed"
        );
        Ok(result)
    }

    // =========================================================================
    // Derived views
    // =========================================================================

    /// Remaining-weighted age of all money still held, 0 with no active pools.
    pub fn current_money_age(&self) -> MoneyAge {
        let days = self
            .ledger
            .weighted_age(self.today())
            .map(round_days)
            .unwrap_or(0);
        MoneyAge {
            days,
            level: self.config.thresholds.level_for(days),
        }
    }

    pub fn statistics(&self) -> MoneyAgeStatistics {
        let today = self.today();
        let active: Vec<&ResourcePool> = self.pools().iter().filter(|p| p.has_remaining()).collect();

        let average_age = self.ledger.weighted_age(today).unwrap_or(0.0);
        let total_resource_pool_balance: f64 = active.iter().map(|p| p.remaining_amount).sum();

        let mut by_account: FxHashMap<AccountId, (f64, f64)> = FxHashMap::default();
        for pool in &active {
            if let Some(account) = &pool.account_id {
                let entry = by_account.entry(account.clone()).or_insert((0.0, 0.0));
                entry.0 += pool.remaining_amount * f64::from(pool.age_in_days(today));
                entry.1 += pool.remaining_amount;
            }
        }
        let age_by_account = by_account
            .into_iter()
            .map(|(account, (weighted, total))| (account, weighted / total))
            .collect();

        let mut ages: Vec<u32> = active.iter().map(|p| p.age_in_days(today)).collect();
        ages.sort_unstable();

        MoneyAgeStatistics {
            average_age,
            level: self.config.thresholds.level_for(round_days(average_age)),
            age_by_category: FxHashMap::default(),
            age_by_account,
            total_resource_pool_balance,
            active_pool_count: active.len(),
            total_pool_count: self.pools().len(),
            min_age: ages.first().copied(),
            max_age: ages.last().copied(),
            median_age: median(&ages),
            calculated_at: today,
        }
    }

    /// Drop all pools and consumptions and reset id counters.
    pub fn clear(&mut self) {
        info!(
            pools = self.ledger.pools().len(),
            consumptions = self.ledger.consumptions().len(),
            "money age ledger cleared"
        );
        self.ledger.clear();
    }
}

fn median(sorted: &[u32]) -> Option<f64> {
    match sorted.len() {
        0 => None,
        n if n % 2 == 1 => Some(f64::from(sorted[n / 2])),
        n => Some((f64::from(sorted[n / 2 - 1]) + f64::from(sorted[n / 2])) / 2.0),
    }
}
