use clap::Subcommand;
use horologe_core::{Config, ConfigError};

/// Keys accepted by `config get` and `config set`.
const KEYS: &[&str] = &[
    "pomodoro.work_min",
    "pomodoro.short_break_min",
    "pomodoro.long_break_min",
    "pomodoro.cycles_before_long_break",
    "ticks.stopwatch_ms",
    "ticks.countdown_ms",
    "ticks.pomodoro_ms",
    "ticks.alarm_ms",
    "clock.hour24",
    "clock.show_seconds",
    "clock.utc_offset_minutes",
    "notifications.enabled",
];

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print one value, e.g. `ticks.stopwatch_ms` or `clock.utc_offset_minutes`
    Get {
        /// Dot-separated key (see `config keys`)
        key: String,
    },
    /// Change one value and save it
    ///
    /// Durations must stay above zero and `clock.utc_offset_minutes` within
    /// ±1439. Pomodoro minutes here only seed a fresh install; use
    /// `pomodoro settings` once settings have been saved.
    Set {
        /// Dot-separated key (see `config keys`)
        key: String,
        /// New value; "none" clears `clock.utc_offset_minutes`
        #[arg(allow_hyphen_values = true)]
        value: String,
    },
    /// Print the whole config as JSON
    List,
    /// List every settable key
    Keys,
    /// Overwrite config.toml with the defaults
    Reset,
    /// Print the config.toml location
    Path,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            println!("{key} = {}", config.get(&key).unwrap_or(value));
        }
        ConfigAction::List => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Keys => {
            for key in KEYS {
                println!("{key}");
            }
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
        ConfigAction::Path => {
            println!("{}", Config::path()?.display());
        }
    }
    Ok(())
}
