//! Broker error types.

use ballast_core::{AccountId, ExecutorId};
use thiserror::Error;

use crate::ledger::LedgerError;

/// Rejection reasons for broker operations.
///
/// Every rejected operation leaves broker state unchanged and tells the
/// caller exactly why.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("broker is disabled")]
    Disabled,

    #[error("caller {0} is not authorized to open trades")]
    UnauthorizedCaller(AccountId),

    #[error("caller {0} is not an administrator")]
    NotAdmin(AccountId),

    #[error("executor {0} is not recognized by this broker")]
    UnknownExecutor(ExecutorId),

    #[error("auction length {got_ms}ms outside (0, {max_ms}ms]")]
    InvalidAuctionLength { got_ms: i64, max_ms: i64 },

    #[error("re-entrant trade open rejected")]
    Reentrancy,

    #[error("fund transfer failed: {0}")]
    Transfer(#[from] LedgerError),
}

pub type BrokerResult<T> = Result<T, BrokerError>;
