//! Broker configuration.

use ballast_core::AccountId;
use serde::{Deserialize, Serialize};

use crate::auction::MAX_AUCTION_LENGTH_MS;
use crate::error::BrokerError;

/// Configuration for one broker instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Venue every auction executor runs on.
    pub venue: AccountId,

    /// How long each auction runs (ms). Must be in
    /// `(0, MAX_AUCTION_LENGTH_MS]`.
    #[serde(default = "default_auction_length_ms")]
    pub auction_length_ms: i64,
}

fn default_auction_length_ms() -> i64 {
    900_000 // 15 minutes
}

impl BrokerConfig {
    pub fn new(venue: AccountId) -> Self {
        Self {
            venue,
            auction_length_ms: default_auction_length_ms(),
        }
    }

    pub fn validate(&self) -> Result<(), BrokerError> {
        if self.auction_length_ms <= 0 || self.auction_length_ms > MAX_AUCTION_LENGTH_MS {
            return Err(BrokerError::InvalidAuctionLength {
                got_ms: self.auction_length_ms,
                max_ms: MAX_AUCTION_LENGTH_MS,
            });
        }
        Ok(())
    }
}
