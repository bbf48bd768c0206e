use clap::Subcommand;
use horologe_core::display;

use super::{open_engine, print_json, report};

#[derive(Subcommand)]
pub enum StopwatchAction {
    /// Start or resume
    Start,
    /// Pause, keeping elapsed time
    Pause,
    /// Stop and clear elapsed time and laps
    Reset,
    /// Record a lap (only while running)
    Lap,
    /// Print current state
    Status {
        /// Print the `MM:SS.cc` readout instead of JSON
        #[arg(long)]
        text: bool,
    },
}

pub fn run(action: StopwatchAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    let event = match action {
        StopwatchAction::Start => engine.stopwatch_start(),
        StopwatchAction::Pause => engine.stopwatch_pause(),
        StopwatchAction::Reset => engine.stopwatch_reset(),
        StopwatchAction::Lap => engine.stopwatch_lap(),
        StopwatchAction::Status { text } => {
            let snapshot = engine.stopwatch();
            if !text {
                return print_json(&snapshot);
            }
            println!("{}", display::stopwatch(snapshot.elapsed_ms));
            for lap in &snapshot.laps {
                let mark = if Some(lap.sequence_number) == snapshot.best_lap {
                    " best"
                } else if Some(lap.sequence_number) == snapshot.worst_lap {
                    " worst"
                } else {
                    ""
                };
                println!(
                    "Lap {:>3}  {}  {}{mark}",
                    lap.sequence_number,
                    display::stopwatch(lap.split_ms),
                    display::stopwatch(lap.cumulative_ms),
                );
            }
            return Ok(());
        }
    };

    report(event, &engine.stopwatch())
}
