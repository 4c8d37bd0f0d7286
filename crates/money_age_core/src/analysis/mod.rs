//! Read-only interpretation of calculator output
//!
//! - [`trend`]: direction and spread of a forecast series
//! - [`health`]: how past expenses distribute over the health levels

pub mod health;
pub mod trend;

pub use health::{HealthStatus, HealthSummary, LevelShare};
pub use trend::{TrendDirection, TrendSummary};
