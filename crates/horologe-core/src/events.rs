use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::alarm::AlarmDefinition;
use crate::timer::{Lap, PomodoroConfig, PomodoroPhase, SavedPreset};

/// Every state change in the engine produces an Event.
/// UI collaborators render them; completion and fire events are also
/// forwarded to the notifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    StopwatchStarted {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchPaused {
        elapsed_ms: u64,
        at: DateTime<Utc>,
    },
    StopwatchReset {
        at: DateTime<Utc>,
    },
    LapRecorded {
        lap: Lap,
        at: DateTime<Utc>,
    },
    CountdownArmed {
        target_ms: u64,
        at: DateTime<Utc>,
    },
    CountdownStarted {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    CountdownPaused {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    CountdownReset {
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// One-shot: emitted exactly once per run that reaches zero.
    CountdownCompleted {
        target_ms: u64,
        at: DateTime<Utc>,
    },
    PresetSaved {
        preset: SavedPreset,
        at: DateTime<Utc>,
    },
    PresetDeleted {
        id: String,
        at: DateTime<Utc>,
    },
    PresetLoaded {
        id: String,
        duration_ms: u64,
        at: DateTime<Utc>,
    },
    PhaseStarted {
        phase: PomodoroPhase,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    PhasePaused {
        phase: PomodoroPhase,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    PhaseReset {
        phase: PomodoroPhase,
        remaining_ms: u64,
        at: DateTime<Utc>,
    },
    /// A phase countdown reached zero and the machine moved to `next_phase`.
    PhaseCompleted {
        phase: PomodoroPhase,
        next_phase: PomodoroPhase,
        cycles_completed: u32,
        total_work_ms: u64,
        at: DateTime<Utc>,
    },
    PhaseSwitched {
        from: PomodoroPhase,
        to: PomodoroPhase,
        at: DateTime<Utc>,
    },
    PomodoroConfigChanged {
        config: PomodoroConfig,
        at: DateTime<Utc>,
    },
    PomodoroStatsReset {
        at: DateTime<Utc>,
    },
    AlarmAdded {
        alarm: AlarmDefinition,
        at: DateTime<Utc>,
    },
    AlarmUpdated {
        alarm: AlarmDefinition,
        at: DateTime<Utc>,
    },
    AlarmToggled {
        id: String,
        enabled: bool,
        at: DateTime<Utc>,
    },
    AlarmRemoved {
        id: String,
        at: DateTime<Utc>,
    },
    AlarmFired {
        id: String,
        label: String,
        time_of_day: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::StopwatchStarted { at, .. }
            | Event::StopwatchPaused { at, .. }
            | Event::StopwatchReset { at }
            | Event::LapRecorded { at, .. }
            | Event::CountdownArmed { at, .. }
            | Event::CountdownStarted { at, .. }
            | Event::CountdownPaused { at, .. }
            | Event::CountdownReset { at, .. }
            | Event::CountdownCompleted { at, .. }
            | Event::PresetSaved { at, .. }
            | Event::PresetDeleted { at, .. }
            | Event::PresetLoaded { at, .. }
            | Event::PhaseStarted { at, .. }
            | Event::PhasePaused { at, .. }
            | Event::PhaseReset { at, .. }
            | Event::PhaseCompleted { at, .. }
            | Event::PhaseSwitched { at, .. }
            | Event::PomodoroConfigChanged { at, .. }
            | Event::PomodoroStatsReset { at }
            | Event::AlarmAdded { at, .. }
            | Event::AlarmUpdated { at, .. }
            | Event::AlarmToggled { at, .. }
            | Event::AlarmRemoved { at, .. }
            | Event::AlarmFired { at, .. } => *at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_are_tagged_by_type() {
        let ev = Event::CountdownCompleted {
            target_ms: 5_000,
            at: DateTime::<Utc>::UNIX_EPOCH,
        };
        let json = serde_json::to_value(&ev).unwrap();
        assert_eq!(json["type"], "CountdownCompleted");
        assert_eq!(json["target_ms"], 5_000);
    }
}
