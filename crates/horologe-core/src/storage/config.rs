//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Default pomodoro durations (used until settings are saved from the UI)
//! - Tick periods for each timer
//! - Clock display and alarm time zone
//! - Notification toggle
//!
//! Configuration is stored at `~/.config/horologe/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::timer::PomodoroConfig;

/// Default pomodoro durations. Missing fields take the built-in
/// [`PomodoroConfig`] defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PomodoroDefaults {
    pub work_min: u32,
    pub short_break_min: u32,
    pub long_break_min: u32,
    pub cycles_before_long_break: u32,
}

/// Scheduler periods in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickConfig {
    #[serde(default = "default_stopwatch_ms")]
    pub stopwatch_ms: u64,
    #[serde(default = "default_second_ms")]
    pub countdown_ms: u64,
    #[serde(default = "default_second_ms")]
    pub pomodoro_ms: u64,
    #[serde(default = "default_second_ms")]
    pub alarm_ms: u64,
}

/// Clock display and alarm matching zone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockConfig {
    #[serde(default = "default_true")]
    pub hour24: bool,
    #[serde(default = "default_true")]
    pub show_seconds: bool,
    /// Fixed UTC offset for alarm matching; the system zone when unset.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/horologe/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pomodoro: PomodoroDefaults,
    #[serde(default)]
    pub ticks: TickConfig,
    #[serde(default)]
    pub clock: ClockConfig,
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

// Default functions
fn default_stopwatch_ms() -> u64 {
    10
}
fn default_second_ms() -> u64 {
    1000
}
fn default_true() -> bool {
    true
}

impl Default for PomodoroDefaults {
    fn default() -> Self {
        PomodoroConfig::default().into()
    }
}

impl From<PomodoroConfig> for PomodoroDefaults {
    fn from(config: PomodoroConfig) -> Self {
        Self {
            work_min: config.work_min,
            short_break_min: config.short_break_min,
            long_break_min: config.long_break_min,
            cycles_before_long_break: config.cycles_before_long_break,
        }
    }
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            stopwatch_ms: default_stopwatch_ms(),
            countdown_ms: default_second_ms(),
            pomodoro_ms: default_second_ms(),
            alarm_ms: default_second_ms(),
        }
    }
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            hour24: true,
            show_seconds: true,
            utc_offset_minutes: None,
        }
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl PomodoroDefaults {
    pub fn to_pomodoro_config(&self) -> PomodoroConfig {
        PomodoroConfig {
            work_min: self.work_min,
            short_break_min: self.short_break_min,
            long_break_min: self.long_break_min,
            cycles_before_long_break: self.cycles_before_long_break,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => parse_number(value)
                        .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
                    // Optional fields: "none" clears, anything else must be a number.
                    serde_json::Value::Null => match value {
                        "none" | "null" | "" => serde_json::Value::Null,
                        _ => parse_number(value)
                            .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?,
                    },
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    pub fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing the defaults there if it is missing.
    ///
    /// A file that parses but holds values the engine cannot run with (zero
    /// durations, zero tick periods, an offset past ±24h) is rejected.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Self = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json = serde_json::to_value(&*self).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: e.to_string(),
            })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save. Returns error if key is unknown.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Reject values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pomodoro
            .to_pomodoro_config()
            .validate()
            .map_err(|e| ConfigError::InvalidValue {
                key: "pomodoro".into(),
                message: e.to_string(),
            })?;
        let ticks = [
            ("ticks.stopwatch_ms", self.ticks.stopwatch_ms),
            ("ticks.countdown_ms", self.ticks.countdown_ms),
            ("ticks.pomodoro_ms", self.ticks.pomodoro_ms),
            ("ticks.alarm_ms", self.ticks.alarm_ms),
        ];
        for (key, value) in ticks {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    key: key.into(),
                    message: "tick period must be greater than zero".into(),
                });
            }
        }
        if let Some(offset) = self.clock.utc_offset_minutes {
            if offset.abs() >= 24 * 60 {
                return Err(ConfigError::InvalidValue {
                    key: "clock.utc_offset_minutes".into(),
                    message: "offset must be within ±24h".into(),
                });
            }
        }
        Ok(())
    }
}

fn parse_number(value: &str) -> Option<serde_json::Value> {
    if let Ok(n) = value.parse::<u64>() {
        Some(serde_json::Value::Number(n.into()))
    } else if let Ok(n) = value.parse::<i64>() {
        Some(serde_json::Value::Number(n.into()))
    } else {
        value
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(serde_json::Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.pomodoro.work_min, 25);
        assert_eq!(parsed.ticks.stopwatch_ms, 10);
        assert!(parsed.clock.utc_offset_minutes.is_none());
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[pomodoro]\nwork_min = 50\n").unwrap();
        assert_eq!(parsed.pomodoro.work_min, 50);
        assert_eq!(parsed.pomodoro.short_break_min, 5);
        assert_eq!(parsed.ticks.alarm_ms, 1000);
        assert!(parsed.notifications.enabled);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("clock.hour24").as_deref(), Some("true"));
        assert_eq!(cfg.get("pomodoro.work_min").as_deref(), Some("25"));
        assert!(cfg.get("clock.missing_key").is_none());
    }

    #[test]
    fn set_value_updates_nested_fields() {
        let mut cfg = Config::default();
        cfg.set_value("pomodoro.long_break_min", "20").unwrap();
        cfg.set_value("clock.hour24", "false").unwrap();
        cfg.set_value("clock.utc_offset_minutes", "-300").unwrap();
        assert_eq!(cfg.pomodoro.long_break_min, 20);
        assert!(!cfg.clock.hour24);
        assert_eq!(cfg.clock.utc_offset_minutes, Some(-300));
        cfg.set_value("clock.utc_offset_minutes", "none").unwrap();
        assert_eq!(cfg.clock.utc_offset_minutes, None);
    }

    #[test]
    fn set_value_rejects_unknown_key() {
        let mut cfg = Config::default();
        assert!(matches!(
            cfg.set_value("clock.nonexistent_key", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn set_value_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set_value("clock.hour24", "not_a_bool").is_err());
        assert!(cfg.set_value("pomodoro.work_min", "abc").is_err());
    }

    #[test]
    fn set_value_rejects_zero_durations() {
        let mut cfg = Config::default();
        assert!(cfg.set_value("pomodoro.work_min", "0").is_err());
        assert!(cfg.set_value("ticks.alarm_ms", "0").is_err());
        assert_eq!(cfg.pomodoro.work_min, 25);
    }

    #[test]
    fn load_from_writes_defaults_when_missing() {
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.pomodoro.cycles_before_long_break, 4);
        assert!(path.exists());

        std::fs::write(&path, "[ticks]\ncountdown_ms = 250\n").unwrap();
        assert_eq!(Config::load_from(&path).unwrap().ticks.countdown_ms, 250);

        std::fs::write(&path, "not = [valid").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::LoadFailed { .. })
        ));
    }

    #[test]
    fn load_from_rejects_values_the_engine_cannot_run() {
        use tempfile::TempDir;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "[pomodoro]\nwork_min = 0\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { key, .. }) if key == "pomodoro"
        ));

        std::fs::write(&path, "[clock]\nutc_offset_minutes = 1500\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::InvalidValue { key, .. }) if key == "clock.utc_offset_minutes"
        ));

        std::fs::write(&path, "[ticks]\npomodoro_ms = 0\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn pomodoro_defaults_match_built_in_config() {
        assert_eq!(
            Config::default().pomodoro.to_pomodoro_config(),
            PomodoroConfig::default()
        );
        let parsed: Config = toml::from_str("[pomodoro]\nlong_break_min = 30\n").unwrap();
        assert_eq!(parsed.pomodoro.long_break_min, 30);
        assert_eq!(
            parsed.pomodoro.cycles_before_long_break,
            PomodoroConfig::default().cycles_before_long_break
        );
    }
}
