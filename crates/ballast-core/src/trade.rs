//! Rebalancing trade requests.

use crate::{InstrumentId, Quantity};
use serde::{Deserialize, Serialize};

/// A request to trade one basket instrument for another.
///
/// Immutable once submitted: the broker hands the request to a fresh
/// auction executor and never revisits it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeRequest {
    /// Instrument being sold.
    pub sell: InstrumentId,
    /// Amount of the sell instrument to auction off.
    pub sell_amount: Quantity,
    /// Instrument being bought.
    pub buy: InstrumentId,
    /// Minimum acceptable amount of the buy instrument.
    pub min_buy_amount: Quantity,
}

impl TradeRequest {
    pub fn new(
        sell: InstrumentId,
        sell_amount: Quantity,
        buy: InstrumentId,
        min_buy_amount: Quantity,
    ) -> Self {
        Self {
            sell,
            sell_amount,
            buy,
            min_buy_amount,
        }
    }
}
