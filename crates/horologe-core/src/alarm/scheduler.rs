//! Alarm scheduler.
//!
//! Alarms are matched by minute-string equality against the local wall clock,
//! not by instant ranges: definitions are minute-granular while ticks arrive
//! many times per minute. A fire record per `(alarm, minute)` keeps each
//! match to a single fire.
//!
//! Daylight-saving policy: a wall-clock minute that is skipped never fires; a
//! minute that repeats fires on its first occurrence only.

use chrono::{DateTime, Datelike, LocalResult, Offset, TimeZone};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

use super::definition::{AlarmDefinition, DayTag, TimeOfDay};
use crate::clock::Instant;
use crate::error::ValidationError;
use crate::events::Event;

/// The local minute being evaluated, e.g. `07:00 mon`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MinuteKey {
    pub time: TimeOfDay,
    pub day: DayTag,
}

impl MinuteKey {
    pub fn of<Tz: TimeZone>(now: &DateTime<Tz>) -> Self {
        Self {
            time: TimeOfDay::of(now),
            day: DayTag::from(now.weekday()),
        }
    }
}

impl fmt::Display for MinuteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.time, self.day)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FireRecord {
    alarm_id: String,
    minute: MinuteKey,
}

#[derive(Debug, Clone, Default)]
pub struct AlarmScheduler {
    alarms: Vec<AlarmDefinition>,
    fired: Vec<FireRecord>,
}

impl AlarmScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_alarms(alarms: Vec<AlarmDefinition>) -> Self {
        Self {
            alarms,
            fired: Vec::new(),
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn alarms(&self) -> &[AlarmDefinition] {
        &self.alarms
    }

    pub fn get(&self, id: &str) -> Option<&AlarmDefinition> {
        self.alarms.iter().find(|a| a.id == id)
    }

    pub fn has_enabled(&self) -> bool {
        self.alarms.iter().any(|a| a.enabled)
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Add an enabled alarm under a fresh id.
    pub fn add(
        &mut self,
        time_of_day: &str,
        recurrence_days: BTreeSet<DayTag>,
        label: &str,
        now: Instant,
    ) -> Result<Event, ValidationError> {
        let alarm = AlarmDefinition {
            id: Uuid::new_v4().to_string(),
            time_of_day: time_of_day.parse()?,
            enabled: true,
            recurrence_days,
            label: label.trim().to_string(),
        };
        tracing::debug!(id = %alarm.id, time = %alarm.time_of_day, "alarm added");
        self.alarms.push(alarm.clone());
        Ok(Event::AlarmAdded {
            alarm,
            at: now.to_utc(),
        })
    }

    /// Replace time, days and label, keeping id and enabled flag.
    /// Unknown ids are a no-op.
    pub fn edit(
        &mut self,
        id: &str,
        time_of_day: &str,
        recurrence_days: BTreeSet<DayTag>,
        label: &str,
        now: Instant,
    ) -> Result<Option<Event>, ValidationError> {
        let time_of_day: TimeOfDay = time_of_day.parse()?;
        let Some(alarm) = self.alarms.iter_mut().find(|a| a.id == id) else {
            return Ok(None);
        };
        alarm.time_of_day = time_of_day;
        alarm.recurrence_days = recurrence_days;
        alarm.label = label.trim().to_string();
        Ok(Some(Event::AlarmUpdated {
            alarm: alarm.clone(),
            at: now.to_utc(),
        }))
    }

    pub fn toggle(&mut self, id: &str, now: Instant) -> Option<Event> {
        let alarm = self.alarms.iter_mut().find(|a| a.id == id)?;
        alarm.enabled = !alarm.enabled;
        Some(Event::AlarmToggled {
            id: alarm.id.clone(),
            enabled: alarm.enabled,
            at: now.to_utc(),
        })
    }

    pub fn remove(&mut self, id: &str, now: Instant) -> Option<Event> {
        let idx = self.alarms.iter().position(|a| a.id == id)?;
        let removed = self.alarms.remove(idx);
        self.fired.retain(|r| r.alarm_id != removed.id);
        Some(Event::AlarmRemoved {
            id: removed.id,
            at: now.to_utc(),
        })
    }

    /// Decide which alarms fire at `now`. Call once per scheduler tick.
    pub fn evaluate<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> Vec<Event> {
        let minute = MinuteKey::of(now);
        self.fired.retain(|r| r.minute == minute);

        if is_repeated_minute(now) {
            return Vec::new();
        }

        let at = now.with_timezone(&chrono::Utc);
        let mut events = Vec::new();
        for alarm in &self.alarms {
            if !alarm.matches(minute.time, minute.day) {
                continue;
            }
            if self
                .fired
                .iter()
                .any(|r| r.alarm_id == alarm.id && r.minute == minute)
            {
                continue;
            }
            tracing::info!(id = %alarm.id, minute = %minute, "alarm fired");
            self.fired.push(FireRecord {
                alarm_id: alarm.id.clone(),
                minute,
            });
            events.push(Event::AlarmFired {
                id: alarm.id.clone(),
                label: alarm.label.clone(),
                time_of_day: alarm.time_of_day.to_string(),
                at,
            });
        }
        events
    }
}

/// True when `now` is in the second pass through a wall-clock minute that a
/// daylight-saving fallback repeats.
fn is_repeated_minute<Tz: TimeZone>(now: &DateTime<Tz>) -> bool {
    let local = now.naive_local();
    match now.timezone().from_local_datetime(&local) {
        LocalResult::Ambiguous(earliest, _) => earliest.offset().fix() != now.offset().fix(),
        _ => false,
    }
}
