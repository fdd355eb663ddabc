//! The trade broker.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::info;

use ballast_core::{AccountId, ExecutorId, TradeRequest};

use crate::auction::{AuctionFactory, AuctionHandle, AuctionInit, MAX_AUCTION_LENGTH_MS};
use crate::breaker::{CircuitBreaker, TripReason};
use crate::config::BrokerConfig;
use crate::error::{BrokerError, BrokerResult};
use crate::ledger::SettlementLedger;
use crate::roles::AccessPolicy;

/// Authorizes trade requests, creates one auction executor per request,
/// and maintains the protocol-wide kill switch.
///
/// Executors are created-and-disowned: the broker funds them and hands
/// them their parameters, then retains only their identity so a later
/// violation report can be authenticated.
pub struct TradeBroker {
    identity: AccountId,
    venue: AccountId,
    auction_length_ms: AtomicI64,
    breaker: CircuitBreaker,
    /// Identities of executors this broker instantiated. Grows only via
    /// `open_trade`; nothing removes from it.
    recognized: Mutex<HashSet<ExecutorId>>,
    /// Non-reentrant scope for `open_trade`.
    open_scope: Mutex<()>,
    access: Arc<dyn AccessPolicy>,
    factory: Arc<dyn AuctionFactory>,
    ledger: Arc<dyn SettlementLedger>,
}

impl TradeBroker {
    pub fn new(
        identity: AccountId,
        config: BrokerConfig,
        access: Arc<dyn AccessPolicy>,
        factory: Arc<dyn AuctionFactory>,
        ledger: Arc<dyn SettlementLedger>,
    ) -> BrokerResult<Self> {
        config.validate()?;
        Ok(Self {
            identity,
            venue: config.venue,
            auction_length_ms: AtomicI64::new(config.auction_length_ms),
            breaker: CircuitBreaker::new(),
            recognized: Mutex::new(HashSet::new()),
            open_scope: Mutex::new(()),
            access,
            factory,
            ledger,
        })
    }

    /// Open a rebalancing trade: create a fresh executor, fund it with
    /// the sell-side amount, and hand back its handle.
    ///
    /// Rejected (no state change) when the broker is disabled, the
    /// caller is not one of the three basket-management roles, the call
    /// re-enters, or the fund transfer fails.
    pub fn open_trade(
        &self,
        caller: &AccountId,
        request: TradeRequest,
    ) -> BrokerResult<AuctionHandle> {
        // Scoped guard: held for the whole call, released on every exit
        // path, including early rejection.
        let _scope = self
            .open_scope
            .try_lock()
            .ok_or(BrokerError::Reentrancy)?;

        if self.breaker.is_disabled() {
            return Err(BrokerError::Disabled);
        }
        if !self.access.may_open_trades(caller) {
            return Err(BrokerError::UnauthorizedCaller(caller.clone()));
        }

        let init = AuctionInit {
            broker: self.identity.clone(),
            originator: caller.clone(),
            venue: self.venue.clone(),
            auction_length_ms: self.auction_length_ms.load(Ordering::SeqCst),
            request: request.clone(),
        };

        // The executor is fully initialized before any funds move; if
        // the transfer fails the instance is never recognized or funded.
        let handle = self.factory.create(init);
        self.ledger.transfer(
            &request.sell,
            caller,
            &handle.funding_account,
            request.sell_amount,
        )?;
        self.recognized.lock().insert(handle.id.clone());

        info!(
            executor = %handle.id,
            caller = %caller,
            sell = %request.sell,
            sell_amount = %request.sell_amount,
            buy = %request.buy,
            min_buy_amount = %request.min_buy_amount,
            "trade opened"
        );
        Ok(handle)
    }

    /// Violation callback from an executor this broker created.
    ///
    /// Rejected for identities never handed out by `open_trade`.
    /// Otherwise trips the breaker unconditionally, even when already
    /// disabled; only an administrator clears it.
    pub fn report_violation(&self, caller: &ExecutorId) -> BrokerResult<()> {
        if !self.recognized.lock().contains(caller) {
            return Err(BrokerError::UnknownExecutor(caller.clone()));
        }
        self.breaker.trip(TripReason::ViolationReport {
            executor: caller.clone(),
        });
        Ok(())
    }

    /// Administrative: change the auction length for future trades.
    pub fn set_auction_length(&self, caller: &AccountId, length_ms: i64) -> BrokerResult<()> {
        if !self.access.is_admin(caller) {
            return Err(BrokerError::NotAdmin(caller.clone()));
        }
        if length_ms <= 0 || length_ms > MAX_AUCTION_LENGTH_MS {
            return Err(BrokerError::InvalidAuctionLength {
                got_ms: length_ms,
                max_ms: MAX_AUCTION_LENGTH_MS,
            });
        }
        self.auction_length_ms.store(length_ms, Ordering::SeqCst);
        info!(caller = %caller, length_ms, "auction length set");
        Ok(())
    }

    /// Administrative: disable or re-enable the broker unconditionally.
    pub fn set_disabled(&self, caller: &AccountId, disabled: bool) -> BrokerResult<()> {
        if !self.access.is_admin(caller) {
            return Err(BrokerError::NotAdmin(caller.clone()));
        }
        self.breaker.set(disabled);
        Ok(())
    }

    /// Whether the kill switch is engaged.
    pub fn is_disabled(&self) -> bool {
        self.breaker.is_disabled()
    }

    /// Current auction length for new trades.
    pub fn auction_length_ms(&self) -> i64 {
        self.auction_length_ms.load(Ordering::SeqCst)
    }

    /// Whether this broker created the given executor.
    pub fn recognizes(&self, executor: &ExecutorId) -> bool {
        self.recognized.lock().contains(executor)
    }

    /// Number of executors this broker has created.
    pub fn recognized_count(&self) -> usize {
        self.recognized.lock().len()
    }

    /// Why the breaker last tripped, while disabled.
    pub fn trip_reason(&self) -> Option<TripReason> {
        self.breaker.reason()
    }

    /// When the breaker last tripped, while disabled.
    pub fn tripped_at(&self) -> Option<DateTime<Utc>> {
        self.breaker.tripped_at()
    }

    pub fn identity(&self) -> &AccountId {
        &self.identity
    }
}
