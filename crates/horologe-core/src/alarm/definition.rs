use chrono::{Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

/// Minute-granularity wall-clock time, written `HH:MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValidationError> {
        if hour > 23 || minute > 59 {
            return Err(ValidationError::InvalidTimeOfDay(format!("{hour:02}:{minute:02}")));
        }
        Ok(Self { hour, minute })
    }

    pub fn hour(self) -> u8 {
        self.hour
    }

    pub fn minute(self) -> u8 {
        self.minute
    }

    /// The minute a wall-clock time falls in.
    pub fn of<T: Timelike>(time: &T) -> Self {
        Self {
            hour: time.hour() as u8,
            minute: time.minute() as u8,
        }
    }
}

impl FromStr for TimeOfDay {
    type Err = ValidationError;

    /// Accepts `H:MM` or `HH:MM`; minutes must be two digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ValidationError::InvalidTimeOfDay(s.to_string());
        let (h, m) = s.trim().split_once(':').ok_or_else(invalid)?;
        let all_digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
        if !all_digits(h) || h.len() > 2 || !all_digits(m) || m.len() != 2 {
            return Err(invalid());
        }
        let hour: u8 = h.parse().map_err(|_| invalid())?;
        let minute: u8 = m.parse().map_err(|_| invalid())?;
        Self::new(hour, minute).map_err(|_| invalid())
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Weekday tag used in recurrence sets, ordered Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayTag {
    Sun,
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
}

impl DayTag {
    pub const ALL: [DayTag; 7] = [
        DayTag::Sun,
        DayTag::Mon,
        DayTag::Tue,
        DayTag::Wed,
        DayTag::Thu,
        DayTag::Fri,
        DayTag::Sat,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DayTag::Sun => "sun",
            DayTag::Mon => "mon",
            DayTag::Tue => "tue",
            DayTag::Wed => "wed",
            DayTag::Thu => "thu",
            DayTag::Fri => "fri",
            DayTag::Sat => "sat",
        }
    }

    /// Parse a comma- or space-separated list such as `mon,wed,fri`.
    pub fn parse_list(s: &str) -> Result<BTreeSet<DayTag>, ValidationError> {
        s.split(|c: char| c == ',' || c.is_whitespace())
            .filter(|part| !part.is_empty())
            .map(str::parse)
            .collect()
    }
}

impl From<Weekday> for DayTag {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Sun => DayTag::Sun,
            Weekday::Mon => DayTag::Mon,
            Weekday::Tue => DayTag::Tue,
            Weekday::Wed => DayTag::Wed,
            Weekday::Thu => DayTag::Thu,
            Weekday::Fri => DayTag::Fri,
            Weekday::Sat => DayTag::Sat,
        }
    }
}

impl FromStr for DayTag {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        DayTag::ALL
            .into_iter()
            .find(|d| is_day_name(&lower, *d))
            .ok_or_else(|| ValidationError::InvalidWeekday(s.to_string()))
    }
}

/// Accepts the three-letter tag or the full English day name.
fn is_day_name(lower: &str, day: DayTag) -> bool {
    let full = match day {
        DayTag::Sun => "sunday",
        DayTag::Mon => "monday",
        DayTag::Tue => "tuesday",
        DayTag::Wed => "wednesday",
        DayTag::Thu => "thursday",
        DayTag::Fri => "friday",
        DayTag::Sat => "saturday",
    };
    lower == day.as_str() || lower == full
}

impl fmt::Display for DayTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recurring alarm. An empty `recurrence_days` set fires every day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlarmDefinition {
    pub id: String,
    pub time_of_day: TimeOfDay,
    pub enabled: bool,
    #[serde(default)]
    pub recurrence_days: BTreeSet<DayTag>,
    #[serde(default)]
    pub label: String,
}

impl AlarmDefinition {
    /// Whether this alarm should ring at the given minute and weekday.
    pub fn matches(&self, time: TimeOfDay, day: DayTag) -> bool {
        self.enabled
            && self.time_of_day == time
            && (self.recurrence_days.is_empty() || self.recurrence_days.contains(&day))
    }
}
