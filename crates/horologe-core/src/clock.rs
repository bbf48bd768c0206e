//! Clock source.
//!
//! Every component reads "now" through a [`Clock`]; nothing calls the system
//! clock directly. [`ManualClock`] is a shared, advanceable clock for driving
//! the engine deterministically.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A point in time with millisecond resolution (milliseconds since the Unix epoch).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Instant(u64);

impl Instant {
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Milliseconds from `earlier` to `self`, zero if `earlier` is later.
    pub fn saturating_since(self, earlier: Instant) -> u64 {
        self.0.saturating_sub(earlier.0)
    }

    pub fn saturating_add(self, ms: u64) -> Instant {
        Instant(self.0.saturating_add(ms))
    }

    pub fn to_utc(self) -> DateTime<Utc> {
        let ms = i64::try_from(self.0).unwrap_or(i64::MAX);
        DateTime::<Utc>::from_timestamp_millis(ms).unwrap_or(DateTime::<Utc>::MAX_UTC)
    }

    pub fn to_zoned<Tz: TimeZone>(self, tz: &Tz) -> DateTime<Tz> {
        self.to_utc().with_timezone(tz)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for Instant {
    fn from(dt: DateTime<Tz>) -> Self {
        Instant(u64::try_from(dt.timestamp_millis()).unwrap_or(0))
    }
}

/// Supplies the current instant.
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
}

/// Wall clock backed by `SystemTime`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        let ms = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        Instant(u64::try_from(ms).unwrap_or(u64::MAX))
    }
}

/// Manually advanced clock. Clones share the same underlying time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    ms: Arc<AtomicU64>,
}

impl ManualClock {
    pub fn new(start: Instant) -> Self {
        Self {
            ms: Arc::new(AtomicU64::new(start.as_millis())),
        }
    }

    /// Start at the given UTC date-time.
    pub fn at<Tz: TimeZone>(dt: DateTime<Tz>) -> Self {
        Self::new(Instant::from(dt))
    }

    pub fn advance(&self, ms: u64) {
        self.ms.fetch_add(ms, Ordering::SeqCst);
    }

    pub fn set(&self, instant: Instant) {
        self.ms.store(instant.as_millis(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        Instant(self.ms.load(Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(Instant::from_millis(1_000));
        let other = clock.clone();
        clock.advance(500);
        assert_eq!(other.now(), Instant::from_millis(1_500));
    }

    #[test]
    fn saturating_since_never_underflows() {
        let a = Instant::from_millis(10);
        let b = Instant::from_millis(25);
        assert_eq!(b.saturating_since(a), 15);
        assert_eq!(a.saturating_since(b), 0);
    }

    #[test]
    fn utc_conversion_roundtrip() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 1, 7, 0, 0).unwrap();
        let instant = Instant::from(dt);
        assert_eq!(instant.to_utc(), dt);
    }
}
