//! Settlement ledger seam.
//!
//! Token transfer mechanics live outside this crate; the broker only
//! needs to move the sell-side funds from the originator into a freshly
//! created executor's funding account.

use ballast_core::{AccountId, InstrumentId, Quantity};
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("insufficient balance: {account} holds less than {required} {token}")]
    InsufficientBalance {
        account: AccountId,
        token: InstrumentId,
        required: Quantity,
    },

    #[error("transfer refused: {0}")]
    Refused(String),
}

/// Moves tokens between accounts.
pub trait SettlementLedger: Send + Sync {
    fn transfer(
        &self,
        token: &InstrumentId,
        from: &AccountId,
        to: &AccountId,
        amount: Quantity,
    ) -> Result<(), LedgerError>;
}
