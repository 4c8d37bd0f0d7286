//! Calculator configuration
//!
//! `CalculatorConfig` holds everything about a calculator that is policy
//! rather than data: the consumption strategy, the expense scope filters and
//! the health-level thresholds. It deserializes with defaults for missing
//! fields so hosts can keep it in their own settings files.
//!
//! # Builder DSL
//!
//! ```ignore
//! use money_age_core::config::CalculatorBuilder;
//! use money_age_core::strategy::ConsumptionStrategy;
//!
//! let calculator = CalculatorBuilder::new()
//!     .strategy(ConsumptionStrategy::Lifo)
//!     .ledger_filter("household")
//!     .build()?;
//! ```

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::model::{AccountId, LedgerId, LevelThresholds};
use crate::strategy::ConsumptionStrategy;

pub mod builder;

pub use builder::CalculatorBuilder;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    pub strategy: ConsumptionStrategy,
    /// Restrict expense draws to pools tagged with this ledger
    pub ledger_filter: Option<LedgerId>,
    /// Restrict expense draws to pools tagged with this account
    pub account_filter: Option<AccountId>,
    pub thresholds: LevelThresholds,
}

impl CalculatorConfig {
    pub fn validate(&self) -> Result<()> {
        self.thresholds.validate()
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: CalculatorConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}
