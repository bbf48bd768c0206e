use clap::Subcommand;
use horologe_core::DayTag;
use std::collections::BTreeSet;

use super::{open_engine, print_json, report};

#[derive(Subcommand)]
pub enum AlarmAction {
    /// Add an enabled alarm
    Add {
        /// Time of day, HH:MM (24h)
        time: String,
        /// Weekdays, e.g. "mon,wed,fri" (every day when omitted)
        #[arg(long)]
        days: Option<String>,
        #[arg(long, default_value = "")]
        label: String,
    },
    /// Replace an alarm's time, days and label
    Edit {
        id: String,
        time: String,
        #[arg(long)]
        days: Option<String>,
        #[arg(long, default_value = "")]
        label: String,
    },
    /// Enable or disable an alarm
    Toggle { id: String },
    /// Remove an alarm
    Remove { id: String },
    /// List alarms
    List,
}

fn parse_days(days: Option<&str>) -> Result<BTreeSet<DayTag>, Box<dyn std::error::Error>> {
    match days {
        Some(list) => Ok(DayTag::parse_list(list)?),
        None => Ok(BTreeSet::new()),
    }
}

pub fn run(action: AlarmAction) -> Result<(), Box<dyn std::error::Error>> {
    let mut engine = open_engine()?;

    let event = match action {
        AlarmAction::Add { time, days, label } => {
            let days = parse_days(days.as_deref())?;
            Some(engine.alarm_add(&time, days, &label)?)
        }
        AlarmAction::Edit {
            id,
            time,
            days,
            label,
        } => {
            let days = parse_days(days.as_deref())?;
            let event = engine.alarm_edit(&id, &time, days, &label)?;
            if event.is_none() {
                return Err(format!("alarm not found: {id}").into());
            }
            event
        }
        AlarmAction::Toggle { id } => engine.alarm_toggle(&id),
        AlarmAction::Remove { id } => engine.alarm_remove(&id),
        AlarmAction::List => return print_json(&engine.alarms()),
    };

    report(event, &engine.alarms())
}
