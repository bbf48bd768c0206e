mod countdown;
mod pomodoro;
mod presets;
mod stopwatch;

pub use countdown::{Countdown, CountdownSnapshot, DurationInput};
pub use pomodoro::{
    PhaseState, Pomodoro, PomodoroConfig, PomodoroPhase, PomodoroSnapshot, PomodoroStats,
};
pub use presets::{PresetBook, SavedPreset};
pub use stopwatch::{Lap, Stopwatch, StopwatchSnapshot};
