//! Feed error types.

use thiserror::Error;

/// Errors surfaced by price sources and collateral readers.
///
/// These never escape a collateral refresh: the monitor absorbs them
/// into the IFFY status candidate.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    #[error("price source unavailable: {0}")]
    Unavailable(String),

    #[error("price reading stale: {age_ms}ms > {max_age_ms}ms max")]
    Stale { age_ms: i64, max_age_ms: i64 },
}

pub type FeedResult<T> = Result<T, FeedError>;
