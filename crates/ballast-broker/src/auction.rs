//! Auction executor creation seam.
//!
//! Each trade request gets a fresh, one-shot, independently funded
//! executor. The factory fully initializes the instance; the broker
//! keeps only the executor's identity for authenticating a later
//! violation callback, never ownership.

use ballast_core::{AccountId, ExecutorId, TradeRequest};
use chrono::{DateTime, Utc};

/// Upper bound on a single auction's length: one week.
pub const MAX_AUCTION_LENGTH_MS: i64 = 7 * 24 * 60 * 60 * 1000;

/// Everything an executor needs before it can run on its own.
#[derive(Debug, Clone)]
pub struct AuctionInit {
    /// Identity of the broker that created the executor (for the
    /// violation callback path).
    pub broker: AccountId,
    /// The basket manager the trade is executed for.
    pub originator: AccountId,
    /// Venue the auction runs on.
    pub venue: AccountId,
    /// How long the auction runs (ms).
    pub auction_length_ms: i64,
    /// The trade to execute.
    pub request: TradeRequest,
}

/// Handle to a created executor.
///
/// The executor owns the funds transferred into `funding_account` and
/// settles on its own; the handle is identity, not ownership.
#[derive(Debug, Clone)]
pub struct AuctionHandle {
    pub id: ExecutorId,
    pub funding_account: AccountId,
    pub opened_at: DateTime<Utc>,
}

/// Constructs one fully initialized executor per trade request.
pub trait AuctionFactory: Send + Sync {
    fn create(&self, init: AuctionInit) -> AuctionHandle;
}
