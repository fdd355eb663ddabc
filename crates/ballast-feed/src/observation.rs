//! Banded price observations.

use ballast_core::Price;
use serde::{Deserialize, Serialize};

/// A banded price observation for one collateral instrument.
///
/// `low`/`high` bound the instrument's price in target units after
/// applying the oracle tolerance; `peg_price` is the reference-to-target
/// exchange rate checked against the peg band.
///
/// The "unpriced" convention: `high == Price::MAX` paired with
/// `low == 0` means the read succeeded but carries no usable price.
/// Unpriced observations must not overwrite the price cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceObservation {
    /// Lower price bound in target units.
    pub low: Price,
    /// Upper price bound in target units.
    pub high: Price,
    /// Reference-to-target exchange rate.
    pub peg_price: Price,
}

impl PriceObservation {
    pub fn new(low: Price, high: Price, peg_price: Price) -> Self {
        Self {
            low,
            high,
            peg_price,
        }
    }

    /// The observation carrying no usable price information.
    pub fn unpriced() -> Self {
        Self {
            low: Price::ZERO,
            high: Price::MAX,
            peg_price: Price::ZERO,
        }
    }

    /// Whether this observation is unpriced.
    pub fn is_unpriced(&self) -> bool {
        self.high.is_max()
    }
}
