use std::{str::FromStr, time::Duration};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Units added to a product when an oversell is covered by auto-replenishment.
pub const REPLENISH_UNITS: i32 = 100;

/// What happens when a line item asks for more units than are on hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InsufficientStockPolicy {
    /// Fail the whole placement with `InsufficientStock`.
    #[default]
    RejectOrder,
    /// Add [`REPLENISH_UNITS`] to the product, take the sale and flag the order.
    AutoReplenishAndWarn,
}

impl FromStr for InsufficientStockPolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "reject" | "reject_order" => Ok(Self::RejectOrder),
            "auto_replenish" | "auto_replenish_and_warn" => Ok(Self::AutoReplenishAndWarn),
            other => Err(anyhow::anyhow!("unknown insufficient stock policy: {other}")),
        }
    }
}

/// How a ledger line contributes to sales totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SalesValuation {
    /// Current product price, counted once per line regardless of quantity.
    #[default]
    ListPrice,
    /// Price recorded at sale multiplied by quantity sold.
    SaleValue,
}

impl FromStr for SalesValuation {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "list_price" => Ok(Self::ListPrice),
            "sale_value" => Ok(Self::SaleValue),
            other => Err(anyhow::anyhow!("unknown sales valuation: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPolicy {
    pub insufficient_stock: InsufficientStockPolicy,
    /// Total attempts for a placement, first try included. Only transient
    /// storage failures are retried.
    pub max_attempts: u32,
    /// Base delay, doubled after every failed attempt.
    pub retry_backoff: Duration,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            insufficient_stock: InsufficientStockPolicy::default(),
            max_attempts: 3,
            retry_backoff: Duration::from_millis(50),
        }
    }
}

impl PlacementPolicy {
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        self.retry_backoff
            .saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)))
    }
}
