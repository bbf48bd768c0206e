use clap::Args;
use horologe_core::{display, Engine};
use std::time::Duration;
use tokio::time::{interval, sleep, Instant as TokioInstant, MissedTickBehavior};

use super::open_engine;

#[derive(Args)]
pub struct WatchArgs {
    /// How often to print the status line, in milliseconds
    #[arg(long, default_value = "1000")]
    refresh_ms: u64,
    /// Stop after this many milliseconds instead of waiting for Ctrl-C
    #[arg(long)]
    duration_ms: Option<u64>,
}

pub fn run(args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let engine = open_engine()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(watch(engine, args))
}

async fn watch(mut engine: Engine, args: WatchArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut period_ms = engine.tick_period_ms().unwrap_or(1000);
    let mut ticker = interval(Duration::from_millis(period_ms));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let refresh = Duration::from_millis(args.refresh_ms.max(1));
    let mut last_status: Option<TokioInstant> = None;

    let stop_after = sleep(Duration::from_millis(args.duration_ms.unwrap_or(u64::MAX / 4)));
    tokio::pin!(stop_after);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = &mut stop_after, if args.duration_ms.is_some() => break,
            _ = ticker.tick() => {
                for event in engine.tick() {
                    println!("{}", serde_json::to_string(&event)?);
                }
                if last_status.map_or(true, |t| t.elapsed() >= refresh) {
                    println!("{}", status_line(&engine));
                    last_status = Some(TokioInstant::now());
                }

                // Finest period changes as timers start and stop.
                let wanted = engine.tick_period_ms().unwrap_or(1000);
                if wanted != period_ms {
                    tracing::debug!(from = period_ms, to = wanted, "retiming watch loop");
                    period_ms = wanted;
                    ticker = interval(Duration::from_millis(period_ms));
                    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                }
            }
        }
    }
    Ok(())
}

fn status_line(engine: &Engine) -> String {
    let stopwatch = engine.stopwatch();
    let countdown = engine.countdown();
    let pomodoro = engine.pomodoro();
    let enabled = engine.alarms().iter().filter(|a| a.enabled).count();
    format!(
        "stopwatch {}{} | countdown {}{} | {} {}{} | alarms {enabled}",
        display::stopwatch(stopwatch.elapsed_ms),
        if stopwatch.running { "*" } else { "" },
        display::countdown(countdown.remaining_ms),
        if countdown.running { "*" } else { "" },
        pomodoro.phase.label(),
        display::pomodoro(pomodoro.remaining_ms),
        if pomodoro.running { "*" } else { "" },
    )
}
