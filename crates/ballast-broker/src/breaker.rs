//! Protocol-wide circuit breaker.
//!
//! One-way safety fuse: a violation report from a recognized executor
//! disables the broker, and it stays disabled until an administrator
//! explicitly re-enables it.

use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{error, info, warn};

use ballast_core::ExecutorId;

/// Why the breaker tripped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TripReason {
    /// A recognized executor reported it was parameterized incorrectly
    /// or abused.
    ViolationReport { executor: ExecutorId },
    /// Administrative disable.
    Manual,
}

impl std::fmt::Display for TripReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ViolationReport { executor } => {
                write!(f, "violation reported by {executor}")
            }
            Self::Manual => write!(f, "manual"),
        }
    }
}

#[derive(Debug, Clone)]
struct Trip {
    at: DateTime<Utc>,
    reason: TripReason,
}

/// Latched disable flag with reason tracking.
///
/// Thread-safe; shared via the owning broker. Unlike a first-trigger
/// latch, every trip re-records the latest reason: repeated violation
/// reports each leave their mark.
pub struct CircuitBreaker {
    disabled: AtomicBool,
    trip: RwLock<Option<Trip>>,
}

impl Default for CircuitBreaker {
    fn default() -> Self {
        Self::new()
    }
}

impl CircuitBreaker {
    /// Create a breaker in the enabled state.
    #[must_use]
    pub fn new() -> Self {
        Self {
            disabled: AtomicBool::new(false),
            trip: RwLock::new(None),
        }
    }

    /// Check if the breaker is currently disabled.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.disabled.load(Ordering::SeqCst)
    }

    /// Trip the breaker, recording the reason.
    ///
    /// Unconditional: trips again even when already disabled.
    pub fn trip(&self, reason: TripReason) {
        self.trip_at(Utc::now(), reason);
    }

    /// `trip` with an explicit timestamp.
    pub fn trip_at(&self, now: DateTime<Utc>, reason: TripReason) {
        let was_disabled = self.disabled.swap(true, Ordering::SeqCst);
        *self.trip.write() = Some(Trip {
            at: now,
            reason: reason.clone(),
        });

        if was_disabled {
            warn!(reason = %reason, "broker already disabled, reason updated");
        } else {
            error!(reason = %reason, "BROKER DISABLED");
        }
    }

    /// Administrative set: disables or re-enables unconditionally.
    pub fn set(&self, disabled: bool) {
        if disabled {
            self.trip(TripReason::Manual);
        } else {
            let previous = self.trip.write().take();
            self.disabled.store(false, Ordering::SeqCst);
            info!(previous_reason = ?previous.map(|t| t.reason), "broker re-enabled");
        }
    }

    /// When the breaker last tripped.
    ///
    /// Returns `None` while enabled.
    #[must_use]
    pub fn tripped_at(&self) -> Option<DateTime<Utc>> {
        if self.is_disabled() {
            self.trip.read().as_ref().map(|t| t.at)
        } else {
            None
        }
    }

    /// Why the breaker last tripped.
    ///
    /// Returns `None` while enabled.
    #[must_use]
    pub fn reason(&self) -> Option<TripReason> {
        if self.is_disabled() {
            self.trip.read().as_ref().map(|t| t.reason.clone())
        } else {
            None
        }
    }
}
