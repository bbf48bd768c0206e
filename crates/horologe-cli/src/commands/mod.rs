pub mod alarm;
pub mod clock;
pub mod config;
pub mod countdown;
pub mod pomodoro;
pub mod stopwatch;
pub mod watch;

use horologe_core::{Config, Database, Engine, Event, LogNotifier, SystemClock, TickScheduler};
use serde::Serialize;

/// Build an engine over the on-disk database and configuration, then settle
/// any deadline that passed since the previous invocation.
///
/// Settled events go to stderr as JSON lines so stdout stays a single
/// document for the command's own output.
pub fn open_engine() -> Result<Engine, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open()?;
    let mut engine = Engine::new(
        Box::new(SystemClock),
        Box::new(TickScheduler::new()),
        Box::new(db),
        Box::new(LogNotifier),
        config,
    );
    for event in engine.catch_up() {
        eprintln!("{}", serde_json::to_string(&event)?);
    }
    Ok(engine)
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the event a command produced, or the current state when the command
/// was a no-op.
pub fn report<T: Serialize>(
    event: Option<Event>,
    state: &T,
) -> Result<(), Box<dyn std::error::Error>> {
    match event {
        Some(event) => print_json(&event),
        None => print_json(state),
    }
}

pub fn status() -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine()?;
    print_json(&engine.snapshot())
}
