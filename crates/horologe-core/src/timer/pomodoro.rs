//! Pomodoro cycle state machine.
//!
//! Layers work/break phases over a single [`Countdown`]. Phases only advance
//! when the countdown completes; a manual switch re-arms without touching the
//! statistics.
//!
//! ## Phase Transitions
//!
//! ```text
//! Work --(cycle % N != 0)--> ShortBreak --> Work
//! Work --(cycle % N == 0)--> LongBreak  --> Work
//! ```

use serde::{Deserialize, Serialize};

use super::countdown::Countdown;
use crate::clock::Instant;
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PomodoroPhase {
    Work,
    ShortBreak,
    LongBreak,
}

impl PomodoroPhase {
    pub fn label(self) -> &'static str {
        match self {
            PomodoroPhase::Work => "Work",
            PomodoroPhase::ShortBreak => "Short Break",
            PomodoroPhase::LongBreak => "Long Break",
        }
    }
}

impl std::str::FromStr for PomodoroPhase {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', '_', ' '], "").as_str() {
            "work" | "focus" => Ok(PomodoroPhase::Work),
            "shortbreak" | "short" => Ok(PomodoroPhase::ShortBreak),
            "longbreak" | "long" => Ok(PomodoroPhase::LongBreak),
            _ => Err(ValidationError::InvalidValue {
                field: "phase".into(),
                message: format!("unknown phase '{s}'"),
            }),
        }
    }
}

/// Phase durations in minutes and the long-break cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroConfig {
    #[serde(default = "default_work_min")]
    pub work_min: u32,
    #[serde(default = "default_short_break_min")]
    pub short_break_min: u32,
    #[serde(default = "default_long_break_min")]
    pub long_break_min: u32,
    #[serde(default = "default_cycles_before_long_break")]
    pub cycles_before_long_break: u32,
}

fn default_work_min() -> u32 {
    25
}
fn default_short_break_min() -> u32 {
    5
}
fn default_long_break_min() -> u32 {
    15
}
fn default_cycles_before_long_break() -> u32 {
    4
}

impl Default for PomodoroConfig {
    fn default() -> Self {
        Self {
            work_min: default_work_min(),
            short_break_min: default_short_break_min(),
            long_break_min: default_long_break_min(),
            cycles_before_long_break: default_cycles_before_long_break(),
        }
    }
}

impl PomodoroConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("workMin", self.work_min),
            ("shortBreakMin", self.short_break_min),
            ("longBreakMin", self.long_break_min),
            ("cyclesBeforeLongBreak", self.cycles_before_long_break),
        ];
        for (field, value) in fields {
            if value == 0 {
                return Err(ValidationError::InvalidValue {
                    field: field.into(),
                    message: "must be greater than zero".into(),
                });
            }
        }
        Ok(())
    }

    /// Phase duration in milliseconds.
    ///
    /// Uses saturating arithmetic to prevent overflow with large values.
    pub fn duration_ms(&self, phase: PomodoroPhase) -> u64 {
        let minutes = match phase {
            PomodoroPhase::Work => self.work_min,
            PomodoroPhase::ShortBreak => self.short_break_min,
            PomodoroPhase::LongBreak => self.long_break_min,
        };
        u64::from(minutes).saturating_mul(60).saturating_mul(1000)
    }
}

/// Completed-cycle statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PomodoroStats {
    #[serde(default)]
    pub cycles_completed: u32,
    #[serde(default)]
    pub total_work_ms: u64,
}

/// Phase plus its countdown; the part of the machine that changes every tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseState {
    pub phase: PomodoroPhase,
    pub countdown: Countdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PomodoroSnapshot {
    pub phase: PomodoroPhase,
    pub running: bool,
    pub remaining_ms: u64,
    pub target_ms: u64,
    pub progress: f64,
    pub cycles_completed: u32,
    pub total_work_ms: u64,
    pub config: PomodoroConfig,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pomodoro {
    config: PomodoroConfig,
    state: PhaseState,
    stats: PomodoroStats,
}

impl Default for Pomodoro {
    fn default() -> Self {
        Self::new(PomodoroConfig::default())
    }
}

impl Pomodoro {
    /// Starts in Work with the countdown armed to the work duration.
    pub fn new(config: PomodoroConfig) -> Self {
        Self {
            config,
            state: PhaseState {
                phase: PomodoroPhase::Work,
                countdown: Countdown::new(config.duration_ms(PomodoroPhase::Work)),
            },
            stats: PomodoroStats::default(),
        }
    }

    /// Rebuild from persisted parts. A phase state whose target no longer
    /// matches the config is re-armed to the configured duration.
    pub fn restore(
        config: PomodoroConfig,
        stats: PomodoroStats,
        state: Option<PhaseState>,
    ) -> Self {
        let mut pomodoro = Self::new(config);
        pomodoro.stats = stats;
        if let Some(state) = state {
            if state.countdown.target_ms() == config.duration_ms(state.phase) {
                pomodoro.state = state;
            } else {
                pomodoro.state = PhaseState {
                    phase: state.phase,
                    countdown: Countdown::new(config.duration_ms(state.phase)),
                };
            }
        }
        pomodoro
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn phase(&self) -> PomodoroPhase {
        self.state.phase
    }

    pub fn config(&self) -> &PomodoroConfig {
        &self.config
    }

    pub fn stats(&self) -> PomodoroStats {
        self.stats
    }

    pub fn phase_state(&self) -> &PhaseState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.countdown.is_running()
    }

    pub fn remaining(&self, now: Instant) -> u64 {
        self.state.countdown.remaining(now)
    }

    pub fn target_ms(&self) -> u64 {
        self.state.countdown.target_ms()
    }

    /// `(target - remaining) / target`, in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f64 {
        self.state.countdown.progress(now)
    }

    pub fn snapshot(&self, now: Instant) -> PomodoroSnapshot {
        PomodoroSnapshot {
            phase: self.state.phase,
            running: self.is_running(),
            remaining_ms: self.remaining(now),
            target_ms: self.target_ms(),
            progress: self.progress(now),
            cycles_completed: self.stats.cycles_completed,
            total_work_ms: self.stats.total_work_ms,
            config: self.config,
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self, now: Instant) -> Option<Event> {
        let started = self.state.countdown.start(now)?;
        match started {
            Event::CountdownStarted { remaining_ms, at } => Some(Event::PhaseStarted {
                phase: self.state.phase,
                remaining_ms,
                at,
            }),
            _ => None,
        }
    }

    pub fn pause(&mut self, now: Instant) -> Option<Event> {
        match self.state.countdown.pause(now)? {
            Event::CountdownCompleted { .. } => Some(self.advance(now)),
            Event::CountdownPaused { remaining_ms, at } => Some(Event::PhasePaused {
                phase: self.state.phase,
                remaining_ms,
                at,
            }),
            _ => None,
        }
    }

    /// Re-arm the current phase to its full duration.
    pub fn reset(&mut self, now: Instant) -> Option<Event> {
        self.rearm(self.state.phase);
        Some(Event::PhaseReset {
            phase: self.state.phase,
            remaining_ms: self.state.countdown.target_ms(),
            at: now.to_utc(),
        })
    }

    /// Call periodically. Returns `Some(Event::PhaseCompleted)` when the phase ends.
    pub fn tick(&mut self, now: Instant) -> Option<Event> {
        match self.state.countdown.tick(now)? {
            Event::CountdownCompleted { .. } => Some(self.advance(now)),
            _ => None,
        }
    }

    /// Jump to `phase`, paused and fully armed. Statistics are unchanged.
    pub fn switch_phase(&mut self, phase: PomodoroPhase, now: Instant) -> Option<Event> {
        let from = self.state.phase;
        self.rearm(phase);
        Some(Event::PhaseSwitched {
            from,
            to: phase,
            at: now.to_utc(),
        })
    }

    /// Apply new durations. The active phase is paused and re-armed to its new
    /// duration; accumulated statistics are left as they are.
    pub fn set_config(
        &mut self,
        config: PomodoroConfig,
        now: Instant,
    ) -> Result<Event, ValidationError> {
        config.validate()?;
        self.config = config;
        self.rearm(self.state.phase);
        Ok(Event::PomodoroConfigChanged {
            config,
            at: now.to_utc(),
        })
    }

    pub fn reset_stats(&mut self, now: Instant) -> Option<Event> {
        self.stats = PomodoroStats::default();
        Some(Event::PomodoroStatsReset { at: now.to_utc() })
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn rearm(&mut self, phase: PomodoroPhase) {
        self.state = PhaseState {
            phase,
            countdown: Countdown::new(self.config.duration_ms(phase)),
        };
    }

    fn advance(&mut self, now: Instant) -> Event {
        let finished = self.state.phase;
        let next = match finished {
            PomodoroPhase::Work => {
                let cycles = self.stats.cycles_completed.saturating_add(1);
                self.stats.cycles_completed = cycles;
                self.stats.total_work_ms = self
                    .stats
                    .total_work_ms
                    .saturating_add(self.config.duration_ms(PomodoroPhase::Work));
                if cycles % self.config.cycles_before_long_break.max(1) == 0 {
                    PomodoroPhase::LongBreak
                } else {
                    PomodoroPhase::ShortBreak
                }
            }
            PomodoroPhase::ShortBreak | PomodoroPhase::LongBreak => PomodoroPhase::Work,
        };
        self.rearm(next);
        Event::PhaseCompleted {
            phase: finished,
            next_phase: next,
            cycles_completed: self.stats.cycles_completed,
            total_work_ms: self.stats.total_work_ms,
            at: now.to_utc(),
        }
    }
}
