//! Elapsed-time tracker (stopwatch core).
//!
//! Elapsed time is always derived as `accumulated + (now - anchor)`; the
//! display refresh tick never feeds back into the measurement, so a slow or
//! irregular refresh cannot introduce drift.

use serde::{Deserialize, Serialize};

use crate::clock::Instant;
use crate::events::Event;

/// A recorded lap. Immutable once created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lap {
    /// 1-based, assigned in creation order, never reused until reset.
    pub sequence_number: u32,
    pub split_ms: u64,
    pub cumulative_ms: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stopwatch {
    accumulated_ms: u64,
    running: bool,
    anchor: Option<Instant>,
    /// Creation order; displayed reversed.
    #[serde(default)]
    laps: Vec<Lap>,
    #[serde(default)]
    lap_counter: u32,
}

/// Read-only view for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopwatchSnapshot {
    pub elapsed_ms: u64,
    pub running: bool,
    /// Most recent first.
    pub laps: Vec<Lap>,
    pub best_lap: Option<u32>,
    pub worst_lap: Option<u32>,
}

impl Stopwatch {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn elapsed(&self, now: Instant) -> u64 {
        match (self.running, self.anchor) {
            (true, Some(anchor)) => self
                .accumulated_ms
                .saturating_add(now.saturating_since(anchor)),
            _ => self.accumulated_ms,
        }
    }

    /// Laps, most recent first.
    pub fn laps(&self) -> impl Iterator<Item = &Lap> {
        self.laps.iter().rev()
    }

    pub fn lap_count(&self) -> usize {
        self.laps.len()
    }

    /// Sequence number of the fastest lap; `None` with fewer than two laps.
    pub fn best_lap(&self) -> Option<u32> {
        self.extreme_lap(|candidate, current| candidate < current)
    }

    /// Sequence number of the slowest lap; `None` with fewer than two laps.
    pub fn worst_lap(&self) -> Option<u32> {
        self.extreme_lap(|candidate, current| candidate > current)
    }

    pub fn snapshot(&self, now: Instant) -> StopwatchSnapshot {
        StopwatchSnapshot {
            elapsed_ms: self.elapsed(now),
            running: self.running,
            laps: self.laps().copied().collect(),
            best_lap: self.best_lap(),
            worst_lap: self.worst_lap(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: Instant) -> Option<Event> {
        if self.running {
            return None;
        }
        self.running = true;
        self.anchor = Some(now);
        Some(Event::StopwatchStarted {
            elapsed_ms: self.accumulated_ms,
            at: now.to_utc(),
        })
    }

    pub fn pause(&mut self, now: Instant) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.accumulated_ms = self.elapsed(now);
        self.running = false;
        self.anchor = None;
        Some(Event::StopwatchPaused {
            elapsed_ms: self.accumulated_ms,
            at: now.to_utc(),
        })
    }

    pub fn reset(&mut self, now: Instant) -> Option<Event> {
        *self = Self::default();
        Some(Event::StopwatchReset { at: now.to_utc() })
    }

    pub fn lap(&mut self, now: Instant) -> Option<Event> {
        if !self.running {
            return None;
        }
        let current = self.elapsed(now);
        let previous = self.laps.last().map(|l| l.cumulative_ms).unwrap_or(0);
        self.lap_counter += 1;
        let lap = Lap {
            sequence_number: self.lap_counter,
            split_ms: current.saturating_sub(previous),
            cumulative_ms: current,
        };
        self.laps.push(lap);
        Some(Event::LapRecorded {
            lap,
            at: now.to_utc(),
        })
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Scans in creation order and only replaces on a strict improvement,
    /// so ties resolve to the lowest sequence number.
    fn extreme_lap(&self, better: impl Fn(u64, u64) -> bool) -> Option<u32> {
        if self.laps.len() < 2 {
            return None;
        }
        let mut pick = self.laps.first()?;
        for lap in &self.laps[1..] {
            if better(lap.split_ms, pick.split_ms) {
                pick = lap;
            }
        }
        Some(pick.sequence_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn start_is_idempotent() {
        let mut sw = Stopwatch::new();
        assert!(sw.start(at(0)).is_some());
        assert!(sw.start(at(500)).is_none());
        // Anchor is kept from the first start.
        assert_eq!(sw.elapsed(at(1_000)), 1_000);
    }

    #[test]
    fn pause_folds_running_time() {
        let mut sw = Stopwatch::new();
        sw.start(at(0));
        sw.pause(at(1_200));
        assert_eq!(sw.elapsed(at(99_999)), 1_200);
        sw.start(at(5_000));
        assert_eq!(sw.elapsed(at(5_300)), 1_500);
    }

    #[test]
    fn pause_when_idle_is_noop() {
        let mut sw = Stopwatch::new();
        assert!(sw.pause(at(10)).is_none());
        assert_eq!(sw.elapsed(at(10)), 0);
    }

    #[test]
    fn lap_requires_running() {
        let mut sw = Stopwatch::new();
        assert!(sw.lap(at(0)).is_none());
        sw.start(at(0));
        sw.pause(at(100));
        assert!(sw.lap(at(200)).is_none());
        assert_eq!(sw.lap_count(), 0);
    }

    #[test]
    fn laps_split_and_number() {
        let mut sw = Stopwatch::new();
        sw.start(at(0));
        sw.lap(at(1_000));
        sw.lap(at(2_500));
        sw.lap(at(3_000));
        let laps: Vec<_> = sw.laps().copied().collect();
        assert_eq!(laps[0].sequence_number, 3);
        assert_eq!(laps[0].split_ms, 500);
        assert_eq!(laps[2].sequence_number, 1);
        assert_eq!(laps[2].split_ms, 1_000);
        assert!(sw.is_running());
    }

    #[test]
    fn best_and_worst_need_two_laps() {
        let mut sw = Stopwatch::new();
        sw.start(at(0));
        sw.lap(at(1_000));
        assert_eq!(sw.best_lap(), None);
        assert_eq!(sw.worst_lap(), None);
        sw.lap(at(1_400));
        assert_eq!(sw.best_lap(), Some(2));
        assert_eq!(sw.worst_lap(), Some(1));
    }

    #[test]
    fn ties_resolve_to_earliest_lap() {
        let mut sw = Stopwatch::new();
        sw.start(at(0));
        sw.lap(at(500));
        sw.lap(at(1_000));
        sw.lap(at(2_000));
        sw.lap(at(3_000));
        assert_eq!(sw.best_lap(), Some(1));
        assert_eq!(sw.worst_lap(), Some(3));
    }

    #[test]
    fn reset_clears_laps_and_counter() {
        let mut sw = Stopwatch::new();
        sw.start(at(0));
        sw.lap(at(100));
        sw.lap(at(200));
        sw.reset(at(300));
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed(at(400)), 0);
        assert_eq!(sw.lap_count(), 0);
        sw.start(at(1_000));
        sw.lap(at(1_100));
        assert_eq!(sw.laps().next().map(|l| l.sequence_number), Some(1));
    }

    #[test]
    fn snapshot_serializes_camel_case_state() {
        let mut sw = Stopwatch::new();
        sw.start(at(0));
        let json = serde_json::to_value(&sw).unwrap();
        assert_eq!(json["accumulatedMs"], 0);
        assert_eq!(json["running"], true);
        assert_eq!(json["anchor"], 0);
    }

    proptest! {
        #[test]
        fn elapsed_is_continuous_across_pause(steps in proptest::collection::vec(1u64..5_000, 1..20)) {
            let mut sw = Stopwatch::new();
            let mut now = 0u64;
            for (i, step) in steps.iter().enumerate() {
                now += step;
                if i % 2 == 0 {
                    sw.start(at(now));
                } else {
                    let before = sw.elapsed(at(now));
                    sw.pause(at(now));
                    prop_assert_eq!(sw.elapsed(at(now)), before);
                }
            }
        }

        #[test]
        fn lap_splits_sum_to_last_cumulative(gaps in proptest::collection::vec(1u64..10_000, 1..30)) {
            let mut sw = Stopwatch::new();
            sw.start(at(0));
            let mut now = 0u64;
            for gap in &gaps {
                now += gap;
                sw.lap(at(now));
            }
            let total: u64 = sw.laps().map(|l| l.split_ms).sum();
            prop_assert_eq!(total, now);
            let mut numbers: Vec<u32> = sw.laps().map(|l| l.sequence_number).collect();
            numbers.reverse();
            let expected: Vec<u32> = (1..=gaps.len() as u32).collect();
            prop_assert_eq!(numbers, expected);
        }
    }
}
