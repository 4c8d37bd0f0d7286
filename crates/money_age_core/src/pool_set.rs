//! Owned storage for pools and the consumption log
//!
//! Pools sit in a vector kept in the active policy's natural order, with an
//! id -> slot index so plans (which name pools by id) can be applied without
//! scanning. Ids are never reused until the set is cleared.

use jiff::civil::Date;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{MoneyAgeError, Result};
use crate::model::{
    AccountId, ConsumptionId, LedgerId, PoolId, ResourceConsumption, ResourcePool, TransactionId,
};
use crate::strategy::ConsumptionPolicy;

/// Relative tolerance for the per-pool conservation check on restore
const CONSERVATION_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Clone, Default)]
pub(crate) struct PoolSet {
    pools: Vec<ResourcePool>,
    slots: FxHashMap<PoolId, usize>,
    consumptions: Vec<ResourceConsumption>,
    next_pool_id: u32,
    next_consumption_id: u32,
}

/// Optional ledger/account restriction on which pools an expense may draw from
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Scope<'a> {
    pub ledger: Option<&'a LedgerId>,
    pub account: Option<&'a AccountId>,
}

impl PoolSet {
    pub fn pools(&self) -> &[ResourcePool] {
        &self.pools
    }

    pub fn consumptions(&self) -> &[ResourceConsumption] {
        &self.consumptions
    }

    pub fn get(&self, id: PoolId) -> Option<&ResourcePool> {
        self.slots.get(&id).map(|&slot| &self.pools[slot])
    }

    pub fn add_pool(
        &mut self,
        income_transaction_id: TransactionId,
        created_at: Date,
        amount: f64,
        ledger_id: Option<LedgerId>,
        account_id: Option<AccountId>,
        policy: &dyn ConsumptionPolicy,
    ) -> ResourcePool {
        let pool = ResourcePool::new(
            PoolId(self.next_pool_id),
            income_transaction_id,
            created_at,
            amount,
            ledger_id,
            account_id,
        );
        self.next_pool_id += 1;
        self.pools.push(pool.clone());
        self.reorder(policy);
        pool
    }

    pub fn reorder(&mut self, policy: &dyn ConsumptionPolicy) {
        policy.order(&mut self.pools);
        self.reindex();
    }

    fn reindex(&mut self) {
        self.slots = self
            .pools
            .iter()
            .enumerate()
            .map(|(slot, pool)| (pool.id, slot))
            .collect();
    }

    /// Plan `amount` under `policy` and apply it, appending to the log.
    ///
    /// Returns the consumptions produced by this call, in plan order.
    pub fn consume(
        &mut self,
        expense_transaction_id: &TransactionId,
        amount: f64,
        as_of: Date,
        policy: &dyn ConsumptionPolicy,
        scope: Scope<'_>,
    ) -> Vec<ResourceConsumption> {
        let plan = {
            let candidates: Vec<&ResourcePool> = self
                .pools
                .iter()
                .filter(|p| p.in_scope(scope.ledger, scope.account))
                .collect();
            policy.plan(&candidates, amount)
        };

        let mut drawn = Vec::with_capacity(plan.len());
        for draw in plan {
            let Some(&slot) = self.slots.get(&draw.pool_id) else {
                continue;
            };
            let consumption_id = ConsumptionId(self.next_consumption_id);
            if let Some(consumption) =
                self.pools[slot].consume(draw.amount, expense_transaction_id, consumption_id, as_of)
            {
                self.next_consumption_id += 1;
                drawn.push(consumption);
            }
        }

        self.consumptions.extend(drawn.iter().cloned());
        drawn
    }

    /// Remaining-weighted mean age of pools that still hold money.
    pub fn weighted_age(&self, as_of: Date) -> Option<f64> {
        let (weighted, total) = self
            .pools
            .iter()
            .filter(|p| p.has_remaining())
            .fold((0.0, 0.0), |(w, t), p| {
                (
                    w + p.remaining_amount * f64::from(p.age_in_days(as_of)),
                    t + p.remaining_amount,
                )
            });
        (total > 0.0).then(|| weighted / total)
    }

    /// Deep copy of the pools with an empty log, for previews.
    pub fn fork(&self) -> PoolSet {
        PoolSet {
            pools: self.pools.clone(),
            slots: self.slots.clone(),
            consumptions: Vec::new(),
            next_pool_id: self.next_pool_id,
            next_consumption_id: self.next_consumption_id,
        }
    }

    pub fn clear(&mut self) {
        *self = PoolSet::default();
    }

    /// Rebuild a set from exported records, checking the model invariants.
    pub fn from_parts(
        pools: Vec<ResourcePool>,
        consumptions: Vec<ResourceConsumption>,
        policy: &dyn ConsumptionPolicy,
    ) -> Result<PoolSet> {
        let mut consumed_per_pool: FxHashMap<PoolId, f64> = FxHashMap::default();
        for pool in &pools {
            if !pool.original_amount.is_finite() || pool.original_amount <= 0.0 {
                return Err(MoneyAgeError::InvalidExport(format!(
                    "{} has non-positive original amount {}",
                    pool.id, pool.original_amount
                )));
            }
            if !pool.remaining_amount.is_finite()
                || pool.remaining_amount < 0.0
                || pool.remaining_amount > pool.original_amount
            {
                return Err(MoneyAgeError::InvalidExport(format!(
                    "{} has remaining amount {} outside [0, {}]",
                    pool.id, pool.remaining_amount, pool.original_amount
                )));
            }
            if consumed_per_pool.insert(pool.id, 0.0).is_some() {
                return Err(MoneyAgeError::InvalidExport(format!(
                    "duplicate pool id {}",
                    pool.id
                )));
            }
        }

        let mut consumption_ids = FxHashSet::default();
        for consumption in &consumptions {
            if !consumption_ids.insert(consumption.id) {
                return Err(MoneyAgeError::InvalidExport(format!(
                    "duplicate consumption id {}",
                    consumption.id
                )));
            }
            if !consumption.amount.is_finite() || consumption.amount <= 0.0 {
                return Err(MoneyAgeError::InvalidExport(format!(
                    "{} has non-positive amount {}",
                    consumption.id, consumption.amount
                )));
            }
            match consumed_per_pool.get_mut(&consumption.resource_pool_id) {
                Some(total) => *total += consumption.amount,
                None => {
                    return Err(MoneyAgeError::InvalidExport(format!(
                        "{} references unknown {}",
                        consumption.id, consumption.resource_pool_id
                    )));
                }
            }
        }

        for pool in &pools {
            let recorded = consumed_per_pool.get(&pool.id).copied().unwrap_or(0.0);
            let consumed = pool.consumed_amount();
            if (consumed - recorded).abs() > CONSERVATION_TOLERANCE * pool.original_amount.max(1.0)
            {
                return Err(MoneyAgeError::ConservationViolated {
                    pool_id: pool.id,
                    consumed,
                    recorded,
                });
            }
        }

        let next_pool_id = pools.iter().map(|p| p.id.0 + 1).max().unwrap_or(0);
        let next_consumption_id = consumptions.iter().map(|c| c.id.0 + 1).max().unwrap_or(0);

        let mut set = PoolSet {
            pools,
            slots: FxHashMap::default(),
            consumptions,
            next_pool_id,
            next_consumption_id,
        };
        set.reorder(policy);
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{ConsumptionStrategy, Fifo};
    use jiff::civil::date;

    fn seeded() -> PoolSet {
        let mut set = PoolSet::default();
        set.add_pool("a".into(), date(2025, 1, 10), 100.0, None, None, &Fifo);
        set.add_pool("b".into(), date(2025, 1, 1), 300.0, None, None, &Fifo);
        set
    }

    #[test]
    fn test_add_pool_keeps_natural_order_and_index() {
        let set = seeded();
        let dates: Vec<Date> = set.pools().iter().map(|p| p.created_at).collect();
        assert_eq!(dates, vec![date(2025, 1, 1), date(2025, 1, 10)]);
        assert_eq!(set.get(PoolId(0)).unwrap().original_amount, 100.0);
        assert_eq!(set.get(PoolId(1)).unwrap().original_amount, 300.0);
    }

    #[test]
    fn test_weighted_age() {
        let set = seeded();
        // (100 * 10 + 300 * 19) / 400 = 16.75
        let age = set.weighted_age(date(2025, 1, 20)).unwrap();
        assert!((age - 16.75).abs() < 1e-9, "got {age}");
        assert!(PoolSet::default().weighted_age(date(2025, 1, 20)).is_none());
    }

    #[test]
    fn test_fork_is_independent() {
        let set = seeded();
        let mut fork = set.fork();
        fork.consume(
            &"e".into(),
            350.0,
            date(2025, 1, 20),
            ConsumptionStrategy::Fifo.policy(),
            Scope::default(),
        );

        assert_eq!(fork.consumptions().len(), 2);
        assert!(set.consumptions().is_empty());
        assert_eq!(set.get(PoolId(1)).unwrap().remaining_amount, 300.0);
        assert_eq!(fork.get(PoolId(1)).unwrap().remaining_amount, 0.0);
    }

    #[test]
    fn test_from_parts_rejects_unknown_pool_reference() {
        let mut set = seeded();
        set.consume(
            &"e".into(),
            50.0,
            date(2025, 1, 20),
            &Fifo,
            Scope::default(),
        );
        let mut consumptions = set.consumptions().to_vec();
        consumptions[0].resource_pool_id = PoolId(42);

        let err = PoolSet::from_parts(set.pools().to_vec(), consumptions, &Fifo).unwrap_err();
        assert!(matches!(err, MoneyAgeError::InvalidExport(_)), "{err}");
    }

    #[test]
    fn test_from_parts_rejects_conservation_break() {
        let mut set = seeded();
        set.consume(
            &"e".into(),
            50.0,
            date(2025, 1, 20),
            &Fifo,
            Scope::default(),
        );
        let mut pools = set.pools().to_vec();
        pools[0].remaining_amount += 10.0;

        let err = PoolSet::from_parts(pools, set.consumptions().to_vec(), &Fifo).unwrap_err();
        assert!(matches!(err, MoneyAgeError::ConservationViolated { .. }), "{err}");
    }

    #[test]
    fn test_from_parts_restores_counters() {
        let mut set = seeded();
        set.consume(
            &"e".into(),
            50.0,
            date(2025, 1, 20),
            &Fifo,
            Scope::default(),
        );
        let mut restored =
            PoolSet::from_parts(set.pools().to_vec(), set.consumptions().to_vec(), &Fifo).unwrap();

        let pool = restored.add_pool("c".into(), date(2025, 2, 1), 10.0, None, None, &Fifo);
        assert_eq!(pool.id, PoolId(2));
        let drawn = restored.consume(&"f".into(), 1.0, date(2025, 2, 2), &Fifo, Scope::default());
        assert_eq!(drawn[0].id, ConsumptionId(1));
    }
}
