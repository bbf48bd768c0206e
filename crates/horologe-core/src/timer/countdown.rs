//! Countdown core.
//!
//! Remaining time is recomputed from the wall-clock delta since the last
//! flush, never by decrementing per tick, so the completion instant does not
//! depend on how often (or how late) `tick()` is called.
//!
//! ## State Transitions
//!
//! ```text
//! Armed -> Running -> (Paused -> Running)* -> Completed
//!   ^                                            |
//!   +------------------- reset / arm ------------+
//! ```

use serde::{Deserialize, Serialize};

use crate::clock::Instant;
use crate::events::Event;

const MAX_HOURS: u32 = 23;
const MAX_MINUTES: u32 = 59;
const MAX_SECONDS: u32 = 59;

/// A countdown duration as entered by the user.
///
/// Fields are clamped on construction: hours to 0..=23, minutes and seconds to
/// 0..=59. Non-numeric text clamps to zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationInput {
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl DurationInput {
    pub fn new(hours: i64, minutes: i64, seconds: i64) -> Self {
        Self {
            hours: clamp_field(hours, MAX_HOURS),
            minutes: clamp_field(minutes, MAX_MINUTES),
            seconds: clamp_field(seconds, MAX_SECONDS),
        }
    }

    /// Parse raw text fields, clamping instead of failing.
    pub fn parse(hours: &str, minutes: &str, seconds: &str) -> Self {
        Self::new(parse_field(hours), parse_field(minutes), parse_field(seconds))
    }

    /// Split a millisecond duration back into fields (sub-second part dropped).
    pub fn from_ms(ms: u64) -> Self {
        let total_secs = ms / 1000;
        Self::new(
            i64::try_from(total_secs / 3600).unwrap_or(i64::MAX),
            ((total_secs % 3600) / 60) as i64,
            (total_secs % 60) as i64,
        )
    }

    pub fn total_ms(&self) -> u64 {
        (u64::from(self.hours) * 3600 + u64::from(self.minutes) * 60 + u64::from(self.seconds))
            * 1000
    }
}

fn clamp_field(value: i64, max: u32) -> u32 {
    value.clamp(0, i64::from(max)) as u32
}

/// Leading integer of the text, like a lenient number input; anything else is 0.
fn parse_field(text: &str) -> i64 {
    let trimmed = text.trim();
    let (sign, digits) = match trimmed.strip_prefix('-') {
        Some(rest) => (-1, rest),
        None => (1, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    match digits[..end].parse::<i64>() {
        Ok(n) => sign * n,
        Err(e) if matches!(e.kind(), std::num::IntErrorKind::PosOverflow) => sign * i64::MAX,
        Err(_) => 0,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    target_ms: u64,
    remaining_ms: u64,
    running: bool,
    /// Instant `remaining_ms` was last flushed at; only set while running.
    anchor: Option<Instant>,
}

/// Read-only view for renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountdownSnapshot {
    pub target_ms: u64,
    pub remaining_ms: u64,
    pub running: bool,
    pub complete: bool,
    pub progress: f64,
}

impl Countdown {
    pub fn new(target_ms: u64) -> Self {
        Self {
            target_ms,
            remaining_ms: target_ms,
            running: false,
            anchor: None,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn target_ms(&self) -> u64 {
        self.target_ms
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Remaining time at `now`, derived from the anchor while running.
    pub fn remaining(&self, now: Instant) -> u64 {
        match (self.running, self.anchor) {
            (true, Some(anchor)) => self
                .remaining_ms
                .saturating_sub(now.saturating_since(anchor)),
            _ => self.remaining_ms,
        }
    }

    pub fn is_complete(&self) -> bool {
        !self.running && self.remaining_ms == 0
    }

    /// Fraction of the target consumed, in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f64 {
        if self.target_ms == 0 {
            return 0.0;
        }
        let consumed = self.target_ms.saturating_sub(self.remaining(now));
        (consumed as f64 / self.target_ms as f64).clamp(0.0, 1.0)
    }

    pub fn snapshot(&self, now: Instant) -> CountdownSnapshot {
        let remaining_ms = self.remaining(now);
        CountdownSnapshot {
            target_ms: self.target_ms,
            remaining_ms,
            running: self.running,
            complete: remaining_ms == 0 && self.target_ms > 0,
            progress: self.progress(now),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Set a new target. Refused while running.
    pub fn arm(&mut self, target_ms: u64, now: Instant) -> Option<Event> {
        if self.running {
            return None;
        }
        *self = Self::new(target_ms);
        Some(Event::CountdownArmed {
            target_ms,
            at: now.to_utc(),
        })
    }

    pub fn start(&mut self, now: Instant) -> Option<Event> {
        if self.running || self.remaining_ms == 0 {
            return None;
        }
        self.running = true;
        self.anchor = Some(now);
        Some(Event::CountdownStarted {
            remaining_ms: self.remaining_ms,
            at: now.to_utc(),
        })
    }

    /// Pausing after the deadline but before the next tick completes the run.
    pub fn pause(&mut self, now: Instant) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.flush_elapsed(now);
        if self.remaining_ms == 0 {
            return Some(self.complete(now));
        }
        self.running = false;
        self.anchor = None;
        Some(Event::CountdownPaused {
            remaining_ms: self.remaining_ms,
            at: now.to_utc(),
        })
    }

    pub fn reset(&mut self, now: Instant) -> Option<Event> {
        self.running = false;
        self.anchor = None;
        self.remaining_ms = self.target_ms;
        Some(Event::CountdownReset {
            remaining_ms: self.remaining_ms,
            at: now.to_utc(),
        })
    }

    /// Call periodically. Returns `Some(Event::CountdownCompleted)` once when the
    /// run reaches zero.
    pub fn tick(&mut self, now: Instant) -> Option<Event> {
        if !self.running {
            return None;
        }
        self.flush_elapsed(now);
        if self.remaining_ms == 0 {
            return Some(self.complete(now));
        }
        None
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn flush_elapsed(&mut self, now: Instant) {
        if let Some(anchor) = self.anchor {
            self.remaining_ms = self.remaining_ms.saturating_sub(now.saturating_since(anchor));
            self.anchor = Some(now);
        }
    }

    fn complete(&mut self, now: Instant) -> Event {
        self.running = false;
        self.anchor = None;
        self.remaining_ms = 0;
        Event::CountdownCompleted {
            target_ms: self.target_ms,
            at: now.to_utc(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    fn run_ticks(cd: &mut Countdown, step: u64, count: u64) -> usize {
        (1..=count)
            .filter_map(|i| cd.tick(at(i * step)))
            .filter(|e| matches!(e, Event::CountdownCompleted { .. }))
            .count()
    }

    #[test]
    fn completes_once_regardless_of_tick_granularity() {
        let mut coarse = Countdown::new(0);
        coarse.arm(5_000, at(0));
        coarse.start(at(0));
        assert_eq!(run_ticks(&mut coarse, 1_000, 5), 1);
        assert_eq!(coarse.remaining(at(5_000)), 0);

        let mut irregular = Countdown::new(0);
        irregular.arm(5_000, at(0));
        irregular.start(at(0));
        // 700ms ticks land at 4900 (100ms left) and then overshoot to 5600.
        assert_eq!(run_ticks(&mut irregular, 700, 8), 1);
        assert_eq!(irregular.remaining(at(5_600)), 0);
        assert!(irregular.is_complete());
    }

    #[test]
    fn time_while_paused_does_not_count() {
        let mut cd = Countdown::new(10_000);
        cd.start(at(0));
        cd.pause(at(3_000));
        assert_eq!(cd.remaining(at(8_000)), 7_000);
        cd.start(at(8_000));
        assert!(cd.tick(at(14_999)).is_none());
        assert!(matches!(
            cd.tick(at(15_000)),
            Some(Event::CountdownCompleted { target_ms: 10_000, .. })
        ));
        assert!(cd.tick(at(16_000)).is_none());
    }

    #[test]
    fn start_refused_when_complete_or_running() {
        let mut cd = Countdown::new(0);
        assert!(cd.start(at(0)).is_none());
        cd.arm(1_000, at(0));
        assert!(cd.start(at(0)).is_some());
        assert!(cd.start(at(10)).is_none());
        cd.tick(at(1_000));
        assert!(cd.start(at(2_000)).is_none());
    }

    #[test]
    fn arm_refused_while_running() {
        let mut cd = Countdown::new(1_000);
        cd.start(at(0));
        assert!(cd.arm(9_000, at(10)).is_none());
        assert_eq!(cd.target_ms(), 1_000);
    }

    #[test]
    fn reset_restores_target() {
        let mut cd = Countdown::new(4_000);
        cd.start(at(0));
        cd.tick(at(1_500));
        cd.reset(at(1_500));
        assert!(!cd.is_running());
        assert_eq!(cd.remaining(at(9_000)), 4_000);
    }

    #[test]
    fn pause_past_deadline_completes() {
        let mut cd = Countdown::new(1_000);
        cd.start(at(0));
        assert!(matches!(
            cd.pause(at(2_000)),
            Some(Event::CountdownCompleted { .. })
        ));
        assert!(cd.is_complete());
    }

    #[test]
    fn progress_is_bounded() {
        let mut cd = Countdown::new(2_000);
        assert_eq!(cd.progress(at(0)), 0.0);
        cd.start(at(0));
        assert!((cd.progress(at(500)) - 0.25).abs() < f64::EPSILON);
        assert_eq!(cd.progress(at(10_000)), 1.0);
        assert_eq!(Countdown::new(0).progress(at(0)), 0.0);
    }

    #[test]
    fn duration_input_clamps() {
        let d = DurationInput::new(30, 75, -4);
        assert_eq!(d, DurationInput { hours: 23, minutes: 59, seconds: 0 });
        let parsed = DurationInput::parse("1", "abc", "99");
        assert_eq!(parsed, DurationInput { hours: 1, minutes: 0, seconds: 59 });
        assert_eq!(DurationInput::parse("12px", " 5", "").minutes, 5);
        assert_eq!(DurationInput::parse("99999999999999999999", "0", "0").hours, 23);
    }

    #[test]
    fn duration_input_total_and_split() {
        let d = DurationInput::new(1, 2, 3);
        assert_eq!(d.total_ms(), 3_723_000);
        assert_eq!(DurationInput::from_ms(3_723_456), d);
    }
}
