//! Core domain types for the ballast risk core.
//!
//! This crate provides the fundamental types shared by the collateral
//! monitor and the trade broker:
//! - `Price`, `Rate`, `Quantity`: precision-safe numeric types
//! - `AccountId`, `InstrumentId`, `ExecutorId`: identifiers
//! - `TradeRequest`: an immutable rebalancing trade request

pub mod decimal;
pub mod error;
pub mod ident;
pub mod trade;

pub use decimal::{Price, Quantity, Rate};
pub use error::{CoreError, Result};
pub use ident::{AccountId, ExecutorId, InstrumentId};
pub use trade::TradeRequest;
