//! Wall clock model
//!
//! Wall time is never stored. It is derived on demand from a monotonic
//! microsecond counter, a mapping from that counter to UTC, the configured
//! timezone offset and the DST rule for the configured region.
//!
//! Network corrections only replace the monotonic→UTC mapping. Everything
//! that counts down (alarms, windows, scrolls) runs on the monotonic
//! counter, so a correction never makes a running timer jump.

use super::calendar::WallTime;
use super::dst::DstCountry;
use crate::fmt::{info, warn};

/// UTC assumed before the first successful sync (2024-01-01 00:00:00)
pub const DEFAULT_EPOCH_SECONDS: i64 = 1_704_067_200;

const MICROS_PER_SECOND: u64 = 1_000_000;

/// DST-aware wall clock
#[derive(Debug, Clone)]
pub struct Clock {
    /// Monotonic microseconds since boot
    monotonic_us: u64,
    /// Monotonic reading at which `base_utc` was valid
    base_us: u64,
    /// UTC epoch seconds at `base_us`
    base_utc: i64,
    /// Signed offset of local standard time from UTC
    utc_offset_minutes: i16,
    /// `None` when the persisted selector is out of range
    dst_country: Option<DstCountry>,
    /// Monotonic reading of the last correction
    last_sync_us: Option<u64>,
    /// Number of corrections applied since boot
    corrections: u32,
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(0, DstCountry::None.selector())
    }
}

impl Clock {
    /// Create a clock running from [`DEFAULT_EPOCH_SECONDS`]
    pub fn new(timezone_hours: i8, dst_selector: u8) -> Self {
        let mut clock = Self {
            monotonic_us: 0,
            base_us: 0,
            base_utc: DEFAULT_EPOCH_SECONDS,
            utc_offset_minutes: timezone_hours as i16 * 60,
            dst_country: Some(DstCountry::None),
            last_sync_us: None,
            corrections: 0,
        };
        clock.set_dst_selector(dst_selector);
        clock
    }

    /// Advance the monotonic base
    pub fn advance(&mut self, elapsed_us: u64) {
        self.monotonic_us = self.monotonic_us.saturating_add(elapsed_us);
    }

    /// Replace the monotonic→UTC mapping with a network result
    ///
    /// Only the mapping changes; monotonic readings are untouched.
    pub fn apply_correction(&mut self, utc_epoch_seconds: i64) {
        self.base_us = self.monotonic_us;
        self.base_utc = utc_epoch_seconds;
        self.last_sync_us = Some(self.monotonic_us);
        self.corrections = self.corrections.saturating_add(1);
        info!("Clock corrected to {} UTC", utc_epoch_seconds);
    }

    /// Set the timezone offset in whole hours
    pub fn set_timezone(&mut self, timezone_hours: i8) {
        self.utc_offset_minutes = timezone_hours as i16 * 60;
    }

    /// Select the DST region by persisted selector
    ///
    /// Returns false for an unknown selector; the clock then applies no DST.
    pub fn set_dst_selector(&mut self, selector: u8) -> bool {
        self.dst_country = DstCountry::from_selector(selector);
        if self.dst_country.is_none() {
            warn!("Unknown DST selector {}, DST disabled", selector);
        }
        self.dst_country.is_some()
    }

    /// Configured region, `None` if the selector was out of range
    pub fn dst_country(&self) -> Option<DstCountry> {
        self.dst_country
    }

    /// Monotonic microseconds since boot
    pub fn uptime_us(&self) -> u64 {
        self.monotonic_us
    }

    /// Monotonic milliseconds since boot
    pub fn uptime_ms(&self) -> u64 {
        self.monotonic_us / 1000
    }

    /// Monotonic whole seconds since boot
    pub fn uptime_seconds(&self) -> u64 {
        self.monotonic_us / MICROS_PER_SECOND
    }

    /// Current UTC epoch seconds
    pub fn utc_seconds(&self) -> i64 {
        let elapsed = (self.monotonic_us - self.base_us) / MICROS_PER_SECOND;
        self.base_utc.saturating_add(elapsed as i64)
    }

    /// Current local standard time in epoch seconds (no DST)
    pub fn standard_seconds(&self) -> i64 {
        self.utc_seconds()
            .saturating_add(self.utc_offset_minutes as i64 * 60)
    }

    /// Current local time in epoch seconds, DST included
    pub fn local_epoch(&self) -> i64 {
        self.now().to_local_seconds()
    }

    /// Current wall time
    pub fn now(&self) -> WallTime {
        let standard_seconds = self.standard_seconds();
        let standard = WallTime::from_local_seconds(standard_seconds, false);

        match self.dst_country.and_then(DstCountry::rule) {
            Some(rule) if rule.is_active(&standard) => {
                WallTime::from_local_seconds(standard_seconds + rule.shift_seconds(), true)
            }
            _ => standard,
        }
    }

    /// Returns true once any correction has been applied
    pub fn is_synced(&self) -> bool {
        self.last_sync_us.is_some()
    }

    /// Seconds since the last correction
    pub fn since_sync_seconds(&self) -> Option<u64> {
        self.last_sync_us
            .map(|at| (self.monotonic_us - at) / MICROS_PER_SECOND)
    }

    /// Corrections applied since boot
    pub fn correction_count(&self) -> u32 {
        self.corrections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::calendar::{days_from_civil, SECONDS_PER_DAY};

    fn epoch(year: i32, month: u8, day: u8, hour: u8) -> i64 {
        days_from_civil(year, month, day) * SECONDS_PER_DAY + hour as i64 * 3600
    }

    #[test]
    fn test_starts_at_default_epoch() {
        let clock = Clock::default();
        assert_eq!(clock.utc_seconds(), DEFAULT_EPOCH_SECONDS);
        assert!(!clock.is_synced());
        let now = clock.now();
        assert_eq!((now.year, now.month, now.day), (2024, 1, 1));
    }

    #[test]
    fn test_advance_accumulates_sub_second() {
        let mut clock = Clock::default();
        clock.advance(600_000);
        assert_eq!(clock.utc_seconds(), DEFAULT_EPOCH_SECONDS);
        clock.advance(600_000);
        assert_eq!(clock.utc_seconds(), DEFAULT_EPOCH_SECONDS + 1);
        assert_eq!(clock.uptime_ms(), 1200);
    }

    #[test]
    fn test_correction_keeps_monotonic_base() {
        let mut clock = Clock::default();
        clock.advance(5_000_000);
        let uptime = clock.uptime_us();

        clock.apply_correction(epoch(2025, 6, 1, 12));
        assert_eq!(clock.uptime_us(), uptime);
        assert_eq!(clock.utc_seconds(), epoch(2025, 6, 1, 12));
        assert_eq!(clock.since_sync_seconds(), Some(0));

        clock.advance(3_000_000);
        assert_eq!(clock.utc_seconds(), epoch(2025, 6, 1, 12) + 3);
        assert_eq!(clock.since_sync_seconds(), Some(3));
        assert_eq!(clock.correction_count(), 1);
    }

    #[test]
    fn test_timezone_and_dst_applied() {
        // New York: UTC-5, North America DST
        let mut clock = Clock::new(-5, DstCountry::NorthAmerica.selector());

        clock.apply_correction(epoch(2024, 1, 15, 17));
        let winter = clock.now();
        assert_eq!(winter.hour, 12);
        assert!(!winter.dst_active);

        clock.apply_correction(epoch(2024, 7, 15, 17));
        let summer = clock.now();
        assert_eq!(summer.hour, 13);
        assert!(summer.dst_active);
    }

    #[test]
    fn test_unknown_selector_disables_dst() {
        let mut clock = Clock::new(1, 42);
        assert_eq!(clock.dst_country(), None);

        clock.apply_correction(epoch(2024, 7, 15, 10));
        let now = clock.now();
        assert_eq!(now.hour, 11);
        assert!(!now.dst_active);

        assert!(clock.set_dst_selector(DstCountry::Europe.selector()));
        assert_eq!(clock.now().hour, 12);
    }

    #[test]
    fn test_local_epoch_includes_shift() {
        let mut clock = Clock::new(1, DstCountry::Europe.selector());
        clock.apply_correction(epoch(2024, 7, 15, 10));
        assert_eq!(clock.local_epoch(), epoch(2024, 7, 15, 12));
    }
}
