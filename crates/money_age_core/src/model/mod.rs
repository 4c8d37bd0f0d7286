mod ids;
mod level;
mod pool;
mod results;
mod transaction;

pub use ids::{AccountId, ConsumptionId, LedgerId, PoolId, TransactionId};
pub use level::{LevelThresholds, MoneyAgeLevel};
pub use pool::{ResourceConsumption, ResourcePool};
pub use results::{
    AMOUNT_EPSILON, DailyMoneyAge, MoneyAge, MoneyAgeResult, MoneyAgeStatistics,
    weighted_consumption_age,
};
pub(crate) use results::round_days;
pub use transaction::{Transaction, TransactionType};
