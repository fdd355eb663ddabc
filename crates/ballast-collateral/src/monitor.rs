//! Per-instrument collateral monitor.

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use ballast_core::{CoreError, InstrumentId, Price, Rate};
use ballast_feed::{CollateralReader, FeedKind, FeedResult, PriceObservation};

use crate::clock::DefaultClock;
use crate::config::{CollateralConfig, PegBand};
use crate::status::CollateralStatus;

/// Externally visible status transition produced by a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub from: CollateralStatus,
    pub to: CollateralStatus,
}

/// Most recent successfully observed price bounds.
///
/// Used for basket valuation ("lot price") independent of the live
/// status. Updated only on priced successful reads.
#[derive(Debug, Clone, Copy)]
struct SavedPrice {
    low: Price,
    high: Price,
    saved_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct PriceCache {
    saved: Option<SavedPrice>,
}

impl PriceCache {
    fn save(&mut self, low: Price, high: Price, now: DateTime<Utc>) {
        self.saved = Some(SavedPrice {
            low,
            high,
            saved_at: now,
        });
    }

    fn lot_price(&self, now: DateTime<Utc>, timeout_ms: i64) -> Option<(Price, Price)> {
        self.saved
            .filter(|s| (now - s.saved_at).num_milliseconds() <= timeout_ms)
            .map(|s| (s.low, s.high))
    }
}

#[derive(Debug)]
struct MonitorState {
    clock: DefaultClock,
    cache: PriceCache,
    /// Last observed reference rate; a strict decrease is a hard default.
    prev_ref_rate: Rate,
}

/// Per-collateral-instrument health state machine.
///
/// Thread-safe: `refresh()` is callable by anyone, any time, on a shared
/// `Arc<CollateralMonitor>`, and never fails. Price-source errors are
/// absorbed into the IFFY candidate.
pub struct CollateralMonitor {
    token: InstrumentId,
    config: CollateralConfig,
    band: PegBand,
    reader: FeedKind,
    state: Mutex<MonitorState>,
}

impl CollateralMonitor {
    /// Create a monitor for one instrument with a reader selected for its
    /// collateral kind.
    pub fn new(
        token: InstrumentId,
        config: CollateralConfig,
        reader: FeedKind,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let peg = Price::new(reader.target_per_ref().inner());
        let band = PegBand::new(peg, config.default_threshold);
        let prev_ref_rate = reader.ref_per_tok();
        Ok(Self {
            token,
            config,
            band,
            reader,
            state: Mutex::new(MonitorState {
                clock: DefaultClock::new(),
                cache: PriceCache::default(),
                prev_ref_rate,
            }),
        })
    }

    /// Re-evaluate the instrument's status from fresh price data.
    ///
    /// Returns the status transition if the externally visible status
    /// changed, `None` otherwise. Never fails.
    pub fn refresh(&self) -> Option<StatusChange> {
        self.refresh_at(Utc::now())
    }

    /// `refresh` with an explicit evaluation time.
    pub fn refresh_at(&self, now: DateTime<Utc>) -> Option<StatusChange> {
        let mut state = self.state.lock();
        let before = state.clock.status_at(now);

        let mut candidate = match self.reader.try_price(now) {
            Ok(obs) => {
                if !obs.is_unpriced() {
                    state.cache.save(obs.low, obs.high, now);
                }
                if obs.low.is_zero() || !self.band.contains(obs.peg_price) {
                    CollateralStatus::Iffy
                } else {
                    CollateralStatus::Sound
                }
            }
            Err(err) => {
                debug!(token = %self.token, error = %err, "price read failed, counting as provisional default");
                CollateralStatus::Iffy
            }
        };

        // A decreasing backing ratio is never tolerated and never merely
        // IFFY. The tracker updates unconditionally afterward.
        let rate = self.reader.ref_per_tok();
        if rate < state.prev_ref_rate {
            warn!(
                token = %self.token,
                prev = %state.prev_ref_rate,
                current = %rate,
                "reference rate decreased, hard default"
            );
            candidate = CollateralStatus::Disabled;
        }
        state.prev_ref_rate = rate;

        self.mark_status(&mut state, candidate, now);

        let after = state.clock.status_at(now);
        drop(state);

        if before == after {
            return None;
        }
        if after > before {
            warn!(token = %self.token, from = %before, to = %after, "collateral status degraded");
        } else {
            info!(token = %self.token, from = %before, to = %after, "collateral status recovered");
        }
        Some(StatusChange {
            from: before,
            to: after,
        })
    }

    /// Apply hysteresis for a candidate status.
    ///
    /// Handles every candidate generally, whatever the caller: DISABLED
    /// is absorbing, SOUND heals, IFFY proposes `now + delay` without
    /// ever pushing an existing deadline later, DISABLED trips at once.
    fn mark_status(
        &self,
        state: &mut MonitorState,
        candidate: CollateralStatus,
        now: DateTime<Utc>,
    ) {
        if state.clock.status_at(now).is_disabled() {
            return;
        }
        match candidate {
            CollateralStatus::Sound => state.clock.clear(now),
            CollateralStatus::Iffy => {
                let deadline = now
                    .checked_add_signed(Duration::milliseconds(self.config.delay_until_default_ms));
                state.clock.propose(now, deadline);
            }
            CollateralStatus::Disabled => state.clock.trip(now),
        }
    }

    /// Current status.
    pub fn status(&self) -> CollateralStatus {
        self.status_at(Utc::now())
    }

    /// Status at an explicit evaluation time.
    pub fn status_at(&self, now: DateTime<Utc>) -> CollateralStatus {
        self.state.lock().clock.status_at(now)
    }

    /// Attempt a banded price read without touching monitor state.
    pub fn try_price(&self) -> FeedResult<PriceObservation> {
        self.try_price_at(Utc::now())
    }

    /// `try_price` with an explicit evaluation time.
    pub fn try_price_at(&self, now: DateTime<Utc>) -> FeedResult<PriceObservation> {
        self.reader.try_price(now)
    }

    /// Last cached priced bounds, while still within the cache timeout.
    pub fn lot_price(&self) -> Option<(Price, Price)> {
        self.lot_price_at(Utc::now())
    }

    /// `lot_price` with an explicit evaluation time.
    pub fn lot_price_at(&self, now: DateTime<Utc>) -> Option<(Price, Price)> {
        self.state
            .lock()
            .cache
            .lot_price(now, self.config.price_cache_timeout_ms)
    }

    /// The scheduled default time, if any.
    pub fn when_default(&self) -> Option<DateTime<Utc>> {
        self.state.lock().clock.when_default()
    }

    /// Last observed reference rate.
    pub fn prev_reference_rate(&self) -> Rate {
        self.state.lock().prev_ref_rate
    }

    pub fn token(&self) -> &InstrumentId {
        &self.token
    }

    pub fn config(&self) -> &CollateralConfig {
        &self.config
    }

    pub fn peg_band(&self) -> &PegBand {
        &self.band
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ballast_feed::{FeedError, PriceReading, PriceSource, RedemptionSource, YieldBearingReader};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct ScriptedSource {
        reading: Mutex<FeedResult<PriceReading>>,
    }

    impl ScriptedSource {
        fn new(reading: FeedResult<PriceReading>) -> Arc<Self> {
            Arc::new(Self {
                reading: Mutex::new(reading),
            })
        }

        fn set(&self, reading: FeedResult<PriceReading>) {
            *self.reading.lock() = reading;
        }
    }

    impl PriceSource for ScriptedSource {
        fn read(&self) -> FeedResult<PriceReading> {
            self.reading.lock().clone()
        }
    }

    struct ScriptedRate {
        rate: Mutex<Rate>,
    }

    impl ScriptedRate {
        fn new(rate: Rate) -> Arc<Self> {
            Arc::new(Self {
                rate: Mutex::new(rate),
            })
        }

        fn set(&self, rate: Rate) {
            *self.rate.lock() = rate;
        }
    }

    impl RedemptionSource for ScriptedRate {
        fn ref_per_tok(&self) -> Rate {
            *self.rate.lock()
        }
    }

    fn priced(price: Decimal, at: DateTime<Utc>) -> FeedResult<PriceReading> {
        Ok(PriceReading::new(Price::new(price), at))
    }

    struct Fixture {
        source: Arc<ScriptedSource>,
        rate: Arc<ScriptedRate>,
        monitor: CollateralMonitor,
        t0: DateTime<Utc>,
    }

    /// Peg band [0.95, 1.05], 24h grace period, yield-bearing reader so
    /// the redemption rate can be scripted.
    fn fixture() -> Fixture {
        fixture_with(CollateralConfig::default())
    }

    fn fixture_with(config: CollateralConfig) -> Fixture {
        let t0 = Utc::now();
        let source = ScriptedSource::new(priced(dec!(1.0), t0));
        let rate = ScriptedRate::new(Rate::ONE);
        let reader = FeedKind::YieldBearing(YieldBearingReader::new(
            source.clone(),
            rate.clone(),
            config.oracle_error,
            config.oracle_timeout_ms,
        ));
        let monitor = CollateralMonitor::new(InstrumentId::new("USDC"), config, reader).unwrap();
        Fixture {
            source,
            rate,
            monitor,
            t0,
        }
    }

    fn delay() -> Duration {
        Duration::milliseconds(CollateralConfig::default().delay_until_default_ms)
    }

    #[test]
    fn test_sound_reading_stays_sound() {
        let f = fixture();
        assert_eq!(f.monitor.refresh_at(f.t0), None);
        assert_eq!(f.monitor.status_at(f.t0), CollateralStatus::Sound);
        assert!(f.monitor.when_default().is_none());
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let f = fixture();
        f.monitor.refresh_at(f.t0);
        let when = f.monitor.when_default();
        assert_eq!(f.monitor.refresh_at(f.t0), None);
        assert_eq!(f.monitor.when_default(), when);
        assert_eq!(f.monitor.status_at(f.t0), CollateralStatus::Sound);
    }

    #[test]
    fn test_depeg_then_recovery_heals() {
        let f = fixture();

        // Peg band is [0.95, 1.05]; 0.90 is outside.
        f.source.set(priced(dec!(0.90), f.t0));
        let change = f.monitor.refresh_at(f.t0).unwrap();
        assert_eq!(change.from, CollateralStatus::Sound);
        assert_eq!(change.to, CollateralStatus::Iffy);
        assert_eq!(f.monitor.when_default(), Some(f.t0 + delay()));

        // Recovery before the deadline resets the clock entirely.
        let t1 = f.t0 + Duration::hours(1);
        f.source.set(priced(dec!(1.0), t1));
        let change = f.monitor.refresh_at(t1).unwrap();
        assert_eq!(change.from, CollateralStatus::Iffy);
        assert_eq!(change.to, CollateralStatus::Sound);
        assert!(f.monitor.when_default().is_none());
    }

    #[test]
    fn test_consecutive_iffy_episodes_do_not_extend_deadline() {
        let f = fixture();

        f.source.set(priced(dec!(0.90), f.t0));
        f.monitor.refresh_at(f.t0);
        let first_deadline = f.monitor.when_default().unwrap();

        let t1 = f.t0 + Duration::hours(2);
        f.source.set(priced(dec!(0.90), t1));
        assert_eq!(f.monitor.refresh_at(t1), None); // still IFFY, no event
        assert_eq!(f.monitor.when_default(), Some(first_deadline));
    }

    #[test]
    fn test_unhealed_iffy_becomes_disabled_after_deadline() {
        let f = fixture();

        f.source.set(priced(dec!(0.90), f.t0));
        f.monitor.refresh_at(f.t0);
        let deadline = f.monitor.when_default().unwrap();

        // One millisecond before the deadline: still provisional.
        assert_eq!(
            f.monitor.status_at(deadline - Duration::milliseconds(1)),
            CollateralStatus::Iffy
        );
        // At the deadline: permanent.
        assert_eq!(f.monitor.status_at(deadline), CollateralStatus::Disabled);

        // A sound reading after the deadline cannot revive it.
        let t2 = deadline + Duration::hours(1);
        f.source.set(priced(dec!(1.0), t2));
        assert_eq!(f.monitor.refresh_at(t2), None);
        assert_eq!(f.monitor.status_at(t2), CollateralStatus::Disabled);
        assert_eq!(f.monitor.when_default(), Some(deadline));
    }

    #[test]
    fn test_feed_error_absorbed_into_iffy() {
        let f = fixture();

        f.source
            .set(Err(FeedError::Unavailable("transport down".to_string())));
        let change = f.monitor.refresh_at(f.t0).unwrap();
        assert_eq!(change.to, CollateralStatus::Iffy);
        assert!(f.monitor.try_price_at(f.t0).is_err());
    }

    #[test]
    fn test_stale_reading_absorbed_into_iffy() {
        let f = fixture();

        let stale_at = f.t0 - Duration::milliseconds(600_000);
        f.source.set(priced(dec!(1.0), stale_at));
        let change = f.monitor.refresh_at(f.t0).unwrap();
        assert_eq!(change.to, CollateralStatus::Iffy);
    }

    #[test]
    fn test_decreasing_reference_rate_is_hard_default() {
        let f = fixture();
        f.monitor.refresh_at(f.t0);

        // Price is perfectly sound; the backing ratio decrease alone
        // disables, with no grace period.
        let t1 = f.t0 + Duration::minutes(1);
        f.source.set(priced(dec!(1.0), t1));
        f.rate.set(Rate::new(dec!(0.99)));
        let change = f.monitor.refresh_at(t1).unwrap();
        assert_eq!(change.to, CollateralStatus::Disabled);
        assert_eq!(f.monitor.when_default(), Some(t1));

        // Absorbing: a recovered rate and sound price change nothing.
        let t2 = t1 + Duration::minutes(1);
        f.rate.set(Rate::new(dec!(1.2)));
        f.source.set(priced(dec!(1.0), t2));
        assert_eq!(f.monitor.refresh_at(t2), None);
        assert_eq!(f.monitor.status_at(t2), CollateralStatus::Disabled);
    }

    #[test]
    fn test_reference_rate_tracker_updates_unconditionally() {
        let f = fixture();
        f.rate.set(Rate::new(dec!(1.1)));
        f.monitor.refresh_at(f.t0);
        assert_eq!(f.monitor.prev_reference_rate(), Rate::new(dec!(1.1)));
    }

    #[test]
    fn test_zero_low_bound_is_iffy_even_inside_band() {
        let f = fixture();
        f.monitor.refresh_at(f.t0);

        // Redemption rate collapsing to zero zeroes the price bounds
        // while the peg price itself stays inside the band. Rate zero is
        // also a decrease here, so reset the tracker first.
        let t1 = f.t0 + Duration::minutes(1);
        f.rate.set(Rate::ZERO);
        f.source.set(priced(dec!(1.0), t1));
        let change = f.monitor.refresh_at(t1).unwrap();
        // The rate decrease dominates: hard default.
        assert_eq!(change.to, CollateralStatus::Disabled);

        // Isolated low == 0 (no decrease): construct with rate zero.
        let source = ScriptedSource::new(priced(dec!(1.0), t1));
        let rate = ScriptedRate::new(Rate::ZERO);
        let config = CollateralConfig::default();
        let reader = FeedKind::YieldBearing(YieldBearingReader::new(
            source.clone(),
            rate,
            config.oracle_error,
            config.oracle_timeout_ms,
        ));
        let monitor = CollateralMonitor::new(InstrumentId::new("XTOK"), config, reader).unwrap();
        let change = monitor.refresh_at(t1).unwrap();
        assert_eq!(change.to, CollateralStatus::Iffy);
    }

    #[test]
    fn test_unpriced_read_skips_cache() {
        let f = fixture();
        f.monitor.refresh_at(f.t0);
        let cached = f.monitor.lot_price_at(f.t0).unwrap();
        assert_eq!(cached, (Price::new(dec!(0.99)), Price::new(dec!(1.01))));

        let t1 = f.t0 + Duration::minutes(1);
        f.source.set(priced(Decimal::MAX, t1));
        f.monitor.refresh_at(t1);

        // Cache still holds the last priced bounds.
        assert_eq!(f.monitor.lot_price_at(t1).unwrap(), cached);
    }

    #[test]
    fn test_lot_price_expires_after_cache_timeout() {
        let f = fixture();
        f.monitor.refresh_at(f.t0);

        let timeout = Duration::milliseconds(f.monitor.config().price_cache_timeout_ms);
        assert!(f.monitor.lot_price_at(f.t0 + timeout).is_some());
        assert!(f
            .monitor
            .lot_price_at(f.t0 + timeout + Duration::milliseconds(1))
            .is_none());
    }

    #[test]
    fn test_lot_price_survives_feed_outage() {
        let f = fixture();
        f.monitor.refresh_at(f.t0);
        let cached = f.monitor.lot_price_at(f.t0).unwrap();

        let t1 = f.t0 + Duration::minutes(1);
        f.source
            .set(Err(FeedError::Unavailable("transport down".to_string())));
        f.monitor.refresh_at(t1);

        assert_eq!(f.monitor.lot_price_at(t1).unwrap(), cached);
    }

    #[test]
    fn test_overflow_deadline_clamps_to_no_risk() {
        let config = CollateralConfig {
            delay_until_default_ms: i64::MAX,
            ..Default::default()
        };
        let f = fixture_with(config);

        f.source.set(priced(dec!(0.90), f.t0));
        assert_eq!(f.monitor.refresh_at(f.t0), None);
        assert_eq!(f.monitor.status_at(f.t0), CollateralStatus::Sound);
        assert!(f.monitor.when_default().is_none());
    }

    #[test]
    fn test_band_reflects_threshold() {
        let f = fixture();
        assert_eq!(f.monitor.peg_band().bottom(), Price::new(dec!(0.95)));
        assert_eq!(f.monitor.peg_band().top(), Price::new(dec!(1.05)));
    }
}
