use chrono::Local;
use clap::Args;
use horologe_core::{display, Clock, Config, SystemClock};

#[derive(Args)]
pub struct ClockArgs {
    /// Extra zones as UTC offsets in minutes (e.g. --zone 540 --zone -300)
    #[arg(long = "zone", allow_negative_numbers = true)]
    zones: Vec<i32>,
}

pub fn run(args: ClockArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let now = SystemClock.now().to_zoned(&Local);
    println!(
        "{}",
        display::clock(&now, config.clock.hour24, config.clock.show_seconds)
    );
    println!("{}", now.format("%A, %B %-d, %Y"));
    for offset in args.zones {
        let sign = if offset < 0 { '-' } else { '+' };
        println!(
            "UTC{sign}{:02}:{:02}  {}",
            offset.abs() / 60,
            offset.abs() % 60,
            display::world_clock(&now, offset)
        );
    }
    Ok(())
}
