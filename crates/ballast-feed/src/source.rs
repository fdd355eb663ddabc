//! Transport traits for price and redemption-rate reads.

use ballast_core::{Price, Rate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::FeedResult;

/// A single reading from a price transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceReading {
    /// Observed price in target units.
    pub price: Price,
    /// Timestamp of the last transport update for this value.
    pub updated_at: DateTime<Utc>,
}

impl PriceReading {
    pub fn new(price: Price, updated_at: DateTime<Utc>) -> Self {
        Self { price, updated_at }
    }

    /// Age of this reading in milliseconds at `now`.
    pub fn age_ms(&self, now: DateTime<Utc>) -> i64 {
        (now - self.updated_at).num_milliseconds()
    }

    /// Check if the reading is fresh (within threshold) at `now`.
    pub fn is_fresh(&self, now: DateTime<Utc>, max_age_ms: i64) -> bool {
        self.age_ms(now) <= max_age_ms
    }
}

/// Price transport for one instrument.
///
/// External collaborator: may fail outright or hand back a reading that
/// has gone stale. Callers decide what staleness means for them.
pub trait PriceSource: Send + Sync {
    fn read(&self) -> FeedResult<PriceReading>;
}

/// Redemption-rate read for yield-bearing collateral.
///
/// Reports how many reference units one collateral token currently
/// redeems for. Expected to be non-decreasing for this asset class; a
/// decrease is treated as a hard default by the monitor.
pub trait RedemptionSource: Send + Sync {
    fn ref_per_tok(&self) -> Rate;
}
