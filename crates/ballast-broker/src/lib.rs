//! Trade broker for the ballast risk core.
//!
//! The broker authorizes rebalancing trade requests, instantiates one
//! independently funded auction executor per request, tracks the
//! executors it created, and maintains a protocol-wide circuit breaker
//! tripped by misbehaving executors:
//! - `TradeBroker`: authorization, executor lifecycle, kill switch
//! - `CircuitBreaker`: one-way safety fuse with administrative reset
//! - `AuctionFactory` / `SettlementLedger` / `AccessPolicy`: collaborator
//!   seams for executor creation, fund movement, and role checks

pub mod auction;
pub mod breaker;
pub mod broker;
pub mod config;
pub mod error;
pub mod ledger;
pub mod roles;

pub use auction::{AuctionFactory, AuctionHandle, AuctionInit, MAX_AUCTION_LENGTH_MS};
pub use breaker::{CircuitBreaker, TripReason};
pub use broker::TradeBroker;
pub use config::BrokerConfig;
pub use error::{BrokerError, BrokerResult};
pub use ledger::{LedgerError, SettlementLedger};
pub use roles::{AccessPolicy, StaticRoles};
