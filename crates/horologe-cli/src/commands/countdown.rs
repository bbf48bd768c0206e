use clap::Subcommand;
use horologe_core::{display, DurationInput};

use super::{open_engine, print_json, report};

#[derive(Subcommand)]
pub enum CountdownAction {
    /// Arm a new duration (refused while running)
    Set {
        /// Hours, clamped to 0-23
        #[arg(long, default_value = "0")]
        hours: String,
        /// Minutes, clamped to 0-59
        #[arg(long, default_value = "0")]
        minutes: String,
        /// Seconds, clamped to 0-59
        #[arg(long, default_value = "0")]
        seconds: String,
    },
    /// Start or resume
    Start,
    /// Pause, keeping remaining time
    Pause,
    /// Re-arm to the full duration
    Reset,
    /// Print current state
    Status {
        /// Print the `HH:MM:SS` readout instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Save a named preset (defaults to the armed duration)
    Save {
        name: String,
        #[arg(long)]
        hours: Option<String>,
        #[arg(long)]
        minutes: Option<String>,
        #[arg(long)]
        seconds: Option<String>,
    },
    /// Load a preset into the countdown
    Load { id: String },
    /// Delete a preset
    Delete { id: String },
    /// List saved presets
    Presets,
}

pub fn run(action: CountdownAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    let event = match action {
        CountdownAction::Set {
            hours,
            minutes,
            seconds,
        } => engine.countdown_arm(DurationInput::parse(&hours, &minutes, &seconds)),
        CountdownAction::Start => engine.countdown_start(),
        CountdownAction::Pause => engine.countdown_pause(),
        CountdownAction::Reset => engine.countdown_reset(),
        CountdownAction::Status { text } => {
            let snapshot = engine.countdown();
            if text {
                println!("{}", display::countdown(snapshot.remaining_ms));
                return Ok(());
            }
            return print_json(&snapshot);
        }
        CountdownAction::Save {
            name,
            hours,
            minutes,
            seconds,
        } => {
            let input = if hours.is_none() && minutes.is_none() && seconds.is_none() {
                DurationInput::from_ms(engine.countdown().target_ms)
            } else {
                DurationInput::parse(
                    hours.as_deref().unwrap_or("0"),
                    minutes.as_deref().unwrap_or("0"),
                    seconds.as_deref().unwrap_or("0"),
                )
            };
            Some(engine.save_preset(&name, input)?)
        }
        CountdownAction::Load { id } => {
            let events = engine.load_preset(&id);
            if events.is_empty() {
                return Err(format!("preset not found: {id}").into());
            }
            return print_json(&events);
        }
        CountdownAction::Delete { id } => engine.delete_preset(&id),
        CountdownAction::Presets => return print_json(&engine.presets()),
    };

    report(event, &engine.countdown())
}
