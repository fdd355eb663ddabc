//! Collateral monitor configuration.

use ballast_core::{CoreError, InstrumentId, Price, Quantity};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Configuration for one monitored collateral instrument.
///
/// Immutable after monitor construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollateralConfig {
    /// How long saved price bounds stay usable for lot pricing (ms).
    #[serde(default = "default_price_cache_timeout_ms")]
    pub price_cache_timeout_ms: i64,

    /// Oracle tolerance fraction: error band around a read price (0.0-1.0).
    #[serde(default = "default_oracle_error")]
    pub oracle_error: Decimal,

    /// Maximum volume a single rebalancing trade may move.
    #[serde(default = "default_max_trade_volume")]
    pub max_trade_volume: Quantity,

    /// Maximum reading age before a price read counts as stale (ms).
    #[serde(default = "default_oracle_timeout_ms")]
    pub oracle_timeout_ms: i64,

    /// Accounting unit the instrument is priced against.
    #[serde(default = "default_target_unit")]
    pub target_unit: InstrumentId,

    /// Peg tolerance fraction: deviation beyond which the instrument is
    /// suspect (0.0-1.0).
    #[serde(default = "default_default_threshold")]
    pub default_threshold: Decimal,

    /// Grace period between a provisional failure and permanent default (ms).
    #[serde(default = "default_delay_until_default_ms")]
    pub delay_until_default_ms: i64,
}

fn default_price_cache_timeout_ms() -> i64 {
    604_800_000 // 1 week
}
fn default_oracle_error() -> Decimal {
    Decimal::new(1, 2) // 0.01
}
fn default_max_trade_volume() -> Quantity {
    Quantity::new(Decimal::from(1_000_000))
}
fn default_oracle_timeout_ms() -> i64 {
    300_000 // 5 minutes
}
fn default_target_unit() -> InstrumentId {
    InstrumentId::new("USD")
}
fn default_default_threshold() -> Decimal {
    Decimal::new(5, 2) // 0.05
}
fn default_delay_until_default_ms() -> i64 {
    86_400_000 // 24 hours
}

impl Default for CollateralConfig {
    fn default() -> Self {
        Self {
            price_cache_timeout_ms: default_price_cache_timeout_ms(),
            oracle_error: default_oracle_error(),
            max_trade_volume: default_max_trade_volume(),
            oracle_timeout_ms: default_oracle_timeout_ms(),
            target_unit: default_target_unit(),
            default_threshold: default_default_threshold(),
            delay_until_default_ms: default_delay_until_default_ms(),
        }
    }
}

impl CollateralConfig {
    /// Validate the configuration.
    ///
    /// A peg tolerance without a grace period is meaningless: a single
    /// out-of-band reading would default the instrument instantly.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.price_cache_timeout_ms <= 0 {
            return Err(CoreError::InvalidConfig(
                "price_cache_timeout_ms must be positive".to_string(),
            ));
        }
        if self.oracle_timeout_ms <= 0 {
            return Err(CoreError::InvalidConfig(
                "oracle_timeout_ms must be positive".to_string(),
            ));
        }
        if self.oracle_error < Decimal::ZERO || self.oracle_error >= Decimal::ONE {
            return Err(CoreError::InvalidConfig(format!(
                "oracle_error {} outside [0, 1)",
                self.oracle_error
            )));
        }
        if self.default_threshold < Decimal::ZERO || self.default_threshold >= Decimal::ONE {
            return Err(CoreError::InvalidConfig(format!(
                "default_threshold {} outside [0, 1)",
                self.default_threshold
            )));
        }
        if self.delay_until_default_ms < 0 {
            return Err(CoreError::InvalidConfig(
                "delay_until_default_ms must not be negative".to_string(),
            ));
        }
        if self.default_threshold > Decimal::ZERO && self.delay_until_default_ms == 0 {
            return Err(CoreError::InvalidConfig(
                "default_threshold > 0 requires delay_until_default_ms > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Acceptable range for the reference-to-target exchange rate.
///
/// Derived once at construction as `peg ± peg·default_threshold` and
/// immutable afterward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PegBand {
    bottom: Price,
    top: Price,
}

impl PegBand {
    pub fn new(peg: Price, threshold: Decimal) -> Self {
        let delta = peg.inner() * threshold;
        Self {
            bottom: Price::new(peg.inner() - delta),
            top: Price::new(peg.inner() + delta),
        }
    }

    pub fn bottom(&self) -> Price {
        self.bottom
    }

    pub fn top(&self) -> Price {
        self.top
    }

    pub fn contains(&self, price: Price) -> bool {
        self.bottom <= price && price <= self.top
    }
}
