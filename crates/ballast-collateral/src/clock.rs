//! The default clock: a single optional deadline driving the status.

use chrono::{DateTime, Utc};

use crate::status::CollateralStatus;

/// Tracks when a collateral instrument defaults.
///
/// `None` means no default is scheduled (SOUND). A future timestamp is a
/// provisional failure that can still heal (IFFY). A timestamp at or
/// before `now` is permanent (DISABLED) and absorbing: every mutator is
/// a no-op from then on.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultClock {
    when_default: Option<DateTime<Utc>>,
}

impl DefaultClock {
    pub fn new() -> Self {
        Self { when_default: None }
    }

    /// Status as a pure function of `(when_default, now)`.
    pub fn status_at(&self, now: DateTime<Utc>) -> CollateralStatus {
        match self.when_default {
            None => CollateralStatus::Sound,
            Some(t) if t > now => CollateralStatus::Iffy,
            Some(_) => CollateralStatus::Disabled,
        }
    }

    /// The scheduled default time, if any.
    pub fn when_default(&self) -> Option<DateTime<Utc>> {
        self.when_default
    }

    /// A sound reading clears any provisional deadline.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        if self.status_at(now).is_disabled() {
            return;
        }
        self.when_default = None;
    }

    /// Propose a provisional default deadline.
    ///
    /// An existing earlier deadline is never pushed later. `None` is the
    /// overflow-clamp case: a deadline past the representable range is
    /// treated as no risk and drops any scheduled deadline.
    pub fn propose(&mut self, now: DateTime<Utc>, deadline: Option<DateTime<Utc>>) {
        if self.status_at(now).is_disabled() {
            return;
        }
        match deadline {
            None => self.when_default = None,
            Some(d) => {
                self.when_default = Some(self.when_default.map_or(d, |cur| cur.min(d)));
            }
        }
    }

    /// Default immediately, with no grace period.
    pub fn trip(&mut self, now: DateTime<Utc>) {
        if self.status_at(now).is_disabled() {
            return;
        }
        self.when_default = Some(now);
    }
}
