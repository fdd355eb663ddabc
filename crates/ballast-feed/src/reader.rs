//! Collateral readers: the capability interface and its closed variant set.
//!
//! Specialized collateral kinds differ in how they price themselves and
//! where their reference rate comes from. Rather than open-ended
//! subclassing, the kinds form a closed set (`FeedKind`) behind one
//! capability interface (`CollateralReader`), selected when the monitor
//! is constructed.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::trace;

use ballast_core::{Price, Rate};

use crate::error::FeedResult;
use crate::observation::PriceObservation;
use crate::source::{PriceSource, RedemptionSource};

/// Capability interface for collateral price and rate reads.
pub trait CollateralReader: Send + Sync {
    /// Attempt a banded price read at `now`.
    fn try_price(&self, now: DateTime<Utc>) -> FeedResult<PriceObservation>;

    /// Reference units one collateral token currently redeems for.
    fn ref_per_tok(&self) -> Rate;

    /// Target units one reference unit is expected to be worth.
    fn target_per_ref(&self) -> Rate;
}

/// Compute `price ± price·tolerance`, scaled into token terms.
///
/// Any overflow degrades to the unpriced observation: a read that
/// succeeded but cannot be banded carries no usable price.
fn banded(price: Price, tolerance: Decimal, scale: Rate) -> PriceObservation {
    if price.is_max() {
        return PriceObservation::unpriced();
    }

    let p = price.inner();
    let err = match p.checked_mul(tolerance) {
        Some(e) => e,
        None => {
            trace!(%price, "error band overflow, degrading to unpriced");
            return PriceObservation::unpriced();
        }
    };

    let low = (p - err).max(Decimal::ZERO);
    let high = match p.checked_add(err) {
        Some(h) => h,
        None => {
            trace!(%price, "error band overflow, degrading to unpriced");
            return PriceObservation::unpriced();
        }
    };

    let (low, high) = match (
        low.checked_mul(scale.inner()),
        high.checked_mul(scale.inner()),
    ) {
        (Some(l), Some(h)) => (l, h),
        _ => {
            trace!(%price, %scale, "rate scaling overflow, degrading to unpriced");
            return PriceObservation::unpriced();
        }
    };

    PriceObservation::new(Price::new(low), Price::new(high), price)
}

/// Fiat-pegged collateral (e.g. a fiat-backed stable token).
///
/// One token redeems for exactly one reference unit, and the reference
/// unit is expected to track the target unit one-to-one.
pub struct PeggedReader {
    source: Arc<dyn PriceSource>,
    /// Oracle tolerance fraction (error band around the read price).
    oracle_error: Decimal,
    /// Maximum reading age before the read counts as stale.
    max_age_ms: i64,
}

impl PeggedReader {
    pub fn new(source: Arc<dyn PriceSource>, oracle_error: Decimal, max_age_ms: i64) -> Self {
        Self {
            source,
            oracle_error,
            max_age_ms,
        }
    }
}

impl CollateralReader for PeggedReader {
    fn try_price(&self, now: DateTime<Utc>) -> FeedResult<PriceObservation> {
        let reading = self.source.read()?;
        let age_ms = reading.age_ms(now);
        if age_ms > self.max_age_ms {
            return Err(crate::FeedError::Stale {
                age_ms,
                max_age_ms: self.max_age_ms,
            });
        }
        Ok(banded(reading.price, self.oracle_error, Rate::ONE))
    }

    fn ref_per_tok(&self) -> Rate {
        Rate::ONE
    }

    fn target_per_ref(&self) -> Rate {
        Rate::ONE
    }
}

/// Yield-bearing wrapper over a pegged reference (e.g. a lending-market
/// deposit token).
///
/// The redemption rate scales the priced bounds into token terms; the
/// peg check still applies to the underlying reference unit.
pub struct YieldBearingReader {
    source: Arc<dyn PriceSource>,
    redemption: Arc<dyn RedemptionSource>,
    oracle_error: Decimal,
    max_age_ms: i64,
}

impl YieldBearingReader {
    pub fn new(
        source: Arc<dyn PriceSource>,
        redemption: Arc<dyn RedemptionSource>,
        oracle_error: Decimal,
        max_age_ms: i64,
    ) -> Self {
        Self {
            source,
            redemption,
            oracle_error,
            max_age_ms,
        }
    }
}

impl CollateralReader for YieldBearingReader {
    fn try_price(&self, now: DateTime<Utc>) -> FeedResult<PriceObservation> {
        let reading = self.source.read()?;
        let age_ms = reading.age_ms(now);
        if age_ms > self.max_age_ms {
            return Err(crate::FeedError::Stale {
                age_ms,
                max_age_ms: self.max_age_ms,
            });
        }
        Ok(banded(
            reading.price,
            self.oracle_error,
            self.redemption.ref_per_tok(),
        ))
    }

    fn ref_per_tok(&self) -> Rate {
        self.redemption.ref_per_tok()
    }

    fn target_per_ref(&self) -> Rate {
        Rate::ONE
    }
}

/// The closed set of collateral kinds.
pub enum FeedKind {
    Pegged(PeggedReader),
    YieldBearing(YieldBearingReader),
}

impl CollateralReader for FeedKind {
    fn try_price(&self, now: DateTime<Utc>) -> FeedResult<PriceObservation> {
        match self {
            Self::Pegged(r) => r.try_price(now),
            Self::YieldBearing(r) => r.try_price(now),
        }
    }

    fn ref_per_tok(&self) -> Rate {
        match self {
            Self::Pegged(r) => r.ref_per_tok(),
            Self::YieldBearing(r) => r.ref_per_tok(),
        }
    }

    fn target_per_ref(&self) -> Rate {
        match self {
            Self::Pegged(r) => r.target_per_ref(),
            Self::YieldBearing(r) => r.target_per_ref(),
        }
    }
}
