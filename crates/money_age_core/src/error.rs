use crate::model::{PoolId, TransactionId, TransactionType};

/// Errors surfaced by the money-age engine.
///
/// Underfunded expenses are not errors; they show up as a positive
/// `uncovered_amount` on the result.
#[derive(Debug, thiserror::Error)]
pub enum MoneyAgeError {
    #[error("transaction {transaction_id} is {found:?}, expected {expected:?}")]
    WrongTransactionType {
        transaction_id: TransactionId,
        expected: TransactionType,
        found: TransactionType,
    },

    #[error("transaction {transaction_id} has invalid amount {amount}")]
    InvalidAmount {
        transaction_id: TransactionId,
        amount: f64,
    },

    #[error("unknown consumption strategy code {0}")]
    UnknownStrategy(u8),

    #[error("invalid export: {0}")]
    InvalidExport(String),

    #[error("pool {pool_id} violates conservation: consumed {consumed}, recorded {recorded}")]
    ConservationViolated {
        pool_id: PoolId,
        consumed: f64,
        recorded: f64,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl MoneyAgeError {
    /// True for errors caused by a bad call argument (wrong type or amount).
    pub fn is_invalid_argument(&self) -> bool {
        matches!(
            self,
            MoneyAgeError::WrongTransactionType { .. } | MoneyAgeError::InvalidAmount { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, MoneyAgeError>;
