//! Plain serialization contract for handing state to external storage
//!
//! `export()` produces a [`MoneyAgeExport`]; `restore()` replaces a
//! calculator's state with one, and `from_export()` builds a new calculator
//! from one. Restoring an export reproduces the same current money age and
//! statistics as the calculator it was taken from. The strategy travels as
//! its integer code.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calculator::MoneyAgeCalculator;
use crate::clock::{Clock, SystemClock};
use crate::config::CalculatorConfig;
use crate::error::Result;
use crate::model::{AccountId, LedgerId, ResourceConsumption, ResourcePool};
use crate::pool_set::PoolSet;
use crate::strategy::ConsumptionStrategy;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoneyAgeExport {
    pub pools: Vec<ResourcePool>,
    pub consumptions: Vec<ResourceConsumption>,
    pub strategy: u8,
    pub ledger_filter: Option<LedgerId>,
    pub account_filter: Option<AccountId>,
}

impl MoneyAgeExport {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl MoneyAgeCalculator {
    pub fn export(&self) -> MoneyAgeExport {
        MoneyAgeExport {
            pools: self.pools().to_vec(),
            consumptions: self.consumptions().to_vec(),
            strategy: self.strategy().code(),
            ledger_filter: self.ledger_filter().cloned(),
            account_filter: self.account_filter().cloned(),
        }
    }

    /// Replace all state with `export`.
    ///
    /// The export is validated first; on error the calculator is unchanged.
    /// Level thresholds and the clock are kept, they are not part of the
    /// export.
    pub fn restore(&mut self, export: MoneyAgeExport) -> Result<()> {
        let strategy = ConsumptionStrategy::try_from(export.strategy)?;
        let ledger = PoolSet::from_parts(export.pools, export.consumptions, strategy.policy())?;

        info!(
            pools = ledger.pools().len(),
            consumptions = ledger.consumptions().len(),
            ?strategy,
            "money age state restored"
        );
        self.replace_pool_set(ledger);
        self.set_strategy(strategy);
        self.set_ledger_filter(export.ledger_filter);
        self.set_account_filter(export.account_filter);
        Ok(())
    }

    /// Build a calculator on the system clock from an export.
    pub fn from_export(export: MoneyAgeExport) -> Result<Self> {
        Self::from_export_with_clock(export, SystemClock)
    }

    pub fn from_export_with_clock(
        export: MoneyAgeExport,
        clock: impl Clock + 'static,
    ) -> Result<Self> {
        let mut calculator = Self::with_parts(CalculatorConfig::default(), Arc::new(clock));
        calculator.restore(export)?;
        Ok(calculator)
    }
}
