//! Pool consumption strategies
//!
//! A strategy is a pure plan over `(candidate pools, requested amount)`. It
//! never touches balances itself; the caller applies the plan by calling
//! [`ResourcePool::consume`] on each planned pool in order.
//!
//! [`ConsumptionStrategy`] is the serializable selector. It resolves to a
//! [`ConsumptionPolicy`] object through an exhaustive match, so a new variant
//! cannot be added without a policy to go with it.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::MoneyAgeError;
use crate::model::{AMOUNT_EPSILON, PoolId, ResourcePool};

/// Which pools an expense draws from, and in what proportion
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ConsumptionStrategy {
    /// Oldest income is spent first
    #[default]
    Fifo,
    /// Newest income is spent first
    Lifo,
    /// Every active pool contributes in proportion to its remaining balance
    WeightedAverage,
}

impl ConsumptionStrategy {
    pub fn policy(self) -> &'static dyn ConsumptionPolicy {
        match self {
            ConsumptionStrategy::Fifo => &Fifo,
            ConsumptionStrategy::Lifo => &Lifo,
            ConsumptionStrategy::WeightedAverage => &WeightedAverage,
        }
    }

    /// Integer code used by the export format
    pub fn code(self) -> u8 {
        match self {
            ConsumptionStrategy::Fifo => 0,
            ConsumptionStrategy::Lifo => 1,
            ConsumptionStrategy::WeightedAverage => 2,
        }
    }
}

impl From<ConsumptionStrategy> for u8 {
    fn from(strategy: ConsumptionStrategy) -> Self {
        strategy.code()
    }
}

impl TryFrom<u8> for ConsumptionStrategy {
    type Error = MoneyAgeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(ConsumptionStrategy::Fifo),
            1 => Ok(ConsumptionStrategy::Lifo),
            2 => Ok(ConsumptionStrategy::WeightedAverage),
            other => Err(MoneyAgeError::UnknownStrategy(other)),
        }
    }
}

/// A single planned draw against one pool
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlannedDraw {
    pub pool_id: PoolId,
    pub amount: f64,
}

pub trait ConsumptionPolicy: Send + Sync {
    /// Sort pools into the order this policy naturally walks them.
    fn order(&self, pools: &mut [ResourcePool]);

    /// Plan draws for `amount` across `candidates`.
    ///
    /// Candidates with no remaining balance are ignored. The planned total
    /// never exceeds the candidates' combined balance.
    fn plan(&self, candidates: &[&ResourcePool], amount: f64) -> Vec<PlannedDraw>;
}

pub struct Fifo;
pub struct Lifo;
pub struct WeightedAverage;

fn oldest_first(a: &ResourcePool, b: &ResourcePool) -> Ordering {
    a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id))
}

fn newest_first(a: &ResourcePool, b: &ResourcePool) -> Ordering {
    oldest_first(b, a)
}

fn active<'a>(candidates: &[&'a ResourcePool]) -> Vec<&'a ResourcePool> {
    candidates
        .iter()
        .copied()
        .filter(|p| p.has_remaining())
        .collect()
}

/// Walk already-ordered pools, draining each until `amount` is met.
fn plan_sequential(ordered: &[&ResourcePool], amount: f64) -> Vec<PlannedDraw> {
    let mut draws = Vec::new();
    let mut outstanding = amount;

    for pool in ordered {
        if outstanding <= AMOUNT_EPSILON {
            break;
        }
        let take = outstanding.min(pool.remaining_amount);
        draws.push(PlannedDraw {
            pool_id: pool.id,
            amount: take,
        });
        outstanding -= take;
    }

    draws
}

impl ConsumptionPolicy for Fifo {
    fn order(&self, pools: &mut [ResourcePool]) {
        pools.sort_by(oldest_first);
    }

    fn plan(&self, candidates: &[&ResourcePool], amount: f64) -> Vec<PlannedDraw> {
        let mut ordered = active(candidates);
        ordered.sort_by(|a, b| oldest_first(a, b));
        plan_sequential(&ordered, amount)
    }
}

impl ConsumptionPolicy for Lifo {
    fn order(&self, pools: &mut [ResourcePool]) {
        pools.sort_by(newest_first);
    }

    fn plan(&self, candidates: &[&ResourcePool], amount: f64) -> Vec<PlannedDraw> {
        let mut ordered = active(candidates);
        ordered.sort_by(|a, b| newest_first(a, b));
        plan_sequential(&ordered, amount)
    }
}

impl ConsumptionPolicy for WeightedAverage {
    fn order(&self, pools: &mut [ResourcePool]) {
        pools.sort_by(oldest_first);
    }

    /// One proportional pass, no rebalancing: each pool gives
    /// `amount * remaining / total`, capped at its remaining balance.
    fn plan(&self, candidates: &[&ResourcePool], amount: f64) -> Vec<PlannedDraw> {
        let mut pools = active(candidates);
        pools.sort_by(|a, b| oldest_first(a, b));

        let total_available: f64 = pools.iter().map(|p| p.remaining_amount).sum();
        if amount <= 0.0 || total_available <= 0.0 {
            return Vec::new();
        }

        pools
            .iter()
            .map(|pool| {
                let share = pool.remaining_amount / total_available;
                PlannedDraw {
                    pool_id: pool.id,
                    amount: (amount * share).min(pool.remaining_amount),
                }
            })
            .filter(|draw| draw.amount > 0.0)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TransactionId;
    use jiff::civil::{Date, date};

    fn pool(id: u32, created_at: Date, remaining: f64) -> ResourcePool {
        let mut p = ResourcePool::new(
            PoolId(id),
            TransactionId(format!("income-{id}")),
            created_at,
            remaining.max(1.0),
            None,
            None,
        );
        p.remaining_amount = remaining;
        p
    }

    fn fixture() -> Vec<ResourcePool> {
        // Deliberately out of date order
        vec![
            pool(0, date(2025, 6, 5), 100.0),
            pool(1, date(2025, 5, 1), 100.0),
            pool(2, date(2025, 6, 14), 100.0),
        ]
    }

    #[test]
    fn test_fifo_draws_oldest_first() {
        let pools = fixture();
        let refs: Vec<&ResourcePool> = pools.iter().collect();
        let plan = Fifo.plan(&refs, 150.0);

        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].pool_id, PoolId(1));
        assert_eq!(plan[0].amount, 100.0);
        assert_eq!(plan[1].pool_id, PoolId(0));
        assert_eq!(plan[1].amount, 50.0);
    }

    #[test]
    fn test_lifo_draws_newest_first() {
        let pools = fixture();
        let refs: Vec<&ResourcePool> = pools.iter().collect();
        let plan = Lifo.plan(&refs, 150.0);

        assert_eq!(plan[0].pool_id, PoolId(2));
        assert_eq!(plan[1].pool_id, PoolId(0));
        assert!((plan[1].amount - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_sequential_skips_depleted_pools() {
        let pools = vec![
            pool(0, date(2025, 1, 1), 0.0),
            pool(1, date(2025, 2, 1), 40.0),
        ];
        let refs: Vec<&ResourcePool> = pools.iter().collect();
        let plan = Fifo.plan(&refs, 100.0);

        assert_eq!(plan.len(), 1);
        assert_eq!(plan[0].pool_id, PoolId(1));
        assert_eq!(plan[0].amount, 40.0);
    }

    #[test]
    fn test_weighted_average_proportional() {
        let pools = vec![
            pool(0, date(2025, 1, 1), 300.0),
            pool(1, date(2025, 2, 1), 700.0),
        ];
        let refs: Vec<&ResourcePool> = pools.iter().collect();
        let plan = WeightedAverage.plan(&refs, 500.0);

        assert_eq!(plan.len(), 2);
        assert!((plan[0].amount - 150.0).abs() < 1e-9, "got {}", plan[0].amount);
        assert!((plan[1].amount - 350.0).abs() < 1e-9, "got {}", plan[1].amount);
        let total: f64 = plan.iter().map(|d| d.amount).sum();
        assert!((total - 500.0).abs() < 1e-9);
    }

    #[test]
    fn test_weighted_average_caps_when_underfunded() {
        let pools = vec![
            pool(0, date(2025, 1, 1), 50.0),
            pool(1, date(2025, 2, 1), 150.0),
        ];
        let refs: Vec<&ResourcePool> = pools.iter().collect();
        let plan = WeightedAverage.plan(&refs, 500.0);

        assert_eq!(plan[0].amount, 50.0);
        assert_eq!(plan[1].amount, 150.0);
    }

    #[test]
    fn test_natural_order_breaks_ties_by_id() {
        let same_day = date(2025, 4, 1);
        let mut pools = vec![
            pool(2, same_day, 1.0),
            pool(0, same_day, 1.0),
            pool(1, date(2025, 3, 1), 1.0),
        ];

        Fifo.order(&mut pools);
        let ids: Vec<u32> = pools.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![1, 0, 2]);

        Lifo.order(&mut pools);
        let ids: Vec<u32> = pools.iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec![2, 0, 1]);
    }

    #[test]
    fn test_strategy_codes() {
        for strategy in [
            ConsumptionStrategy::Fifo,
            ConsumptionStrategy::Lifo,
            ConsumptionStrategy::WeightedAverage,
        ] {
            assert_eq!(ConsumptionStrategy::try_from(strategy.code()).unwrap(), strategy);
        }
        assert!(matches!(
            ConsumptionStrategy::try_from(9),
            Err(MoneyAgeError::UnknownStrategy(9))
        ));
        assert_eq!(serde_json::to_string(&ConsumptionStrategy::Lifo).unwrap(), "1");
    }
}
