use clap::Subcommand;
use horologe_core::{display, PomodoroConfig, PomodoroPhase};

use super::{open_engine, print_json, report};

#[derive(Subcommand)]
pub enum PomodoroAction {
    /// Start or resume the current phase
    Start,
    /// Pause the current phase
    Pause,
    /// Re-arm the current phase to its full duration
    Reset,
    /// Jump to a phase (work, short, long)
    Switch { phase: PomodoroPhase },
    /// Change phase durations; omitted values keep their current setting
    Settings {
        #[arg(long)]
        work: Option<u32>,
        #[arg(long)]
        short: Option<u32>,
        #[arg(long)]
        long: Option<u32>,
        /// Work phases before a long break
        #[arg(long)]
        cycles: Option<u32>,
    },
    /// Zero completed cycles and total work time
    ResetStats,
    /// Print current state
    Status {
        /// Print a one-line readout instead of JSON
        #[arg(long)]
        text: bool,
    },
}

pub fn run(action: PomodoroAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    let event = match action {
        PomodoroAction::Start => engine.pomodoro_start(),
        PomodoroAction::Pause => engine.pomodoro_pause(),
        PomodoroAction::Reset => engine.pomodoro_reset(),
        PomodoroAction::Switch { phase } => engine.pomodoro_switch_phase(phase),
        PomodoroAction::Settings {
            work,
            short,
            long,
            cycles,
        } => {
            let current = engine.pomodoro().config;
            let config = PomodoroConfig {
                work_min: work.unwrap_or(current.work_min),
                short_break_min: short.unwrap_or(current.short_break_min),
                long_break_min: long.unwrap_or(current.long_break_min),
                cycles_before_long_break: cycles.unwrap_or(current.cycles_before_long_break),
            };
            Some(engine.pomodoro_set_config(config)?)
        }
        PomodoroAction::ResetStats => engine.pomodoro_reset_stats(),
        PomodoroAction::Status { text } => {
            let snapshot = engine.pomodoro();
            if !text {
                return print_json(&snapshot);
            }
            println!(
                "{} {} ({}) | cycles {} | work {}",
                snapshot.phase.label(),
                display::pomodoro(snapshot.remaining_ms),
                if snapshot.running { "running" } else { "paused" },
                snapshot.cycles_completed,
                display::work_total(snapshot.total_work_ms),
            );
            return Ok(());
        }
    };

    report(event, &engine.pomodoro())
}
