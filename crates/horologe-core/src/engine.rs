//! Engine facade.
//!
//! Owns one instance of each component together with the injected clock,
//! interval scheduler, key-value store and notifier. Front ends call one
//! method per user command and [`Engine::tick`] whenever the scheduler may
//! have something due.
//!
//! Each running timer holds exactly one scheduler subscription. Subscriptions
//! are reconciled after every command and tick: a timer that started gets one,
//! a timer that paused, reset, completed or was re-armed loses it before the
//! command returns. The alarm subscription is always live.

use chrono::{FixedOffset, Local};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;

use crate::alarm::{AlarmDefinition, AlarmScheduler, DayTag};
use crate::clock::{Clock, Instant};
use crate::error::{ConfigError, ValidationError};
use crate::events::Event;
use crate::notify::{Notification, Notifier};
use crate::scheduler::{IntervalScheduler, SubscriptionId};
use crate::storage::{keys, Config, KeyValueStore};
use crate::timer::{
    Countdown, CountdownSnapshot, DurationInput, Pomodoro, PomodoroConfig, PomodoroPhase,
    PomodoroSnapshot, PresetBook, SavedPreset, Stopwatch, StopwatchSnapshot,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Stopwatch,
    Countdown,
    Pomodoro,
    Alarm,
}

impl Slot {
    const ALL: [Slot; 4] = [Slot::Stopwatch, Slot::Countdown, Slot::Pomodoro, Slot::Alarm];
}

#[derive(Debug, Default)]
struct Subscriptions {
    stopwatch: Option<SubscriptionId>,
    countdown: Option<SubscriptionId>,
    pomodoro: Option<SubscriptionId>,
    alarm: Option<SubscriptionId>,
}

impl Subscriptions {
    fn slot_mut(&mut self, slot: Slot) -> &mut Option<SubscriptionId> {
        match slot {
            Slot::Stopwatch => &mut self.stopwatch,
            Slot::Countdown => &mut self.countdown,
            Slot::Pomodoro => &mut self.pomodoro,
            Slot::Alarm => &mut self.alarm,
        }
    }

    fn owner(&self, id: SubscriptionId) -> Option<Slot> {
        Slot::ALL.into_iter().find(|slot| {
            let held = match slot {
                Slot::Stopwatch => self.stopwatch,
                Slot::Countdown => self.countdown,
                Slot::Pomodoro => self.pomodoro,
                Slot::Alarm => self.alarm,
            };
            held == Some(id)
        })
    }

    fn live(&self) -> usize {
        [self.stopwatch, self.countdown, self.pomodoro, self.alarm]
            .iter()
            .filter(|s| s.is_some())
            .count()
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineSnapshot {
    pub stopwatch: StopwatchSnapshot,
    pub countdown: CountdownSnapshot,
    pub presets: Vec<SavedPreset>,
    pub pomodoro: PomodoroSnapshot,
    pub alarms: Vec<AlarmDefinition>,
}

pub struct Engine {
    clock: Box<dyn Clock>,
    scheduler: Box<dyn IntervalScheduler>,
    store: Box<dyn KeyValueStore>,
    notifier: Box<dyn Notifier>,
    config: Config,
    stopwatch: Stopwatch,
    countdown: Countdown,
    presets: PresetBook,
    pomodoro: Pomodoro,
    alarms: AlarmScheduler,
    subs: Subscriptions,
}

impl Engine {
    /// Build an engine from persisted state. Absent or malformed blobs fall
    /// back to defaults; pomodoro durations fall back to `config.pomodoro`,
    /// then to the built-in defaults if that is invalid too.
    pub fn new(
        clock: Box<dyn Clock>,
        scheduler: Box<dyn IntervalScheduler>,
        store: Box<dyn KeyValueStore>,
        notifier: Box<dyn Notifier>,
        config: Config,
    ) -> Self {
        let stopwatch = load_json(store.as_ref(), keys::STOPWATCH).unwrap_or_default();
        let countdown = load_json(store.as_ref(), keys::COUNTDOWN).unwrap_or_default();
        let presets = load_json(store.as_ref(), keys::SAVED_TIMERS).unwrap_or_default();
        let pomodoro_config = load_json::<PomodoroConfig>(store.as_ref(), keys::POMODORO_SETTINGS)
            .filter(|c| c.validate().is_ok())
            .or_else(|| Some(config.pomodoro.to_pomodoro_config()))
            .filter(|c| c.validate().is_ok())
            .unwrap_or_default();
        let pomodoro = Pomodoro::restore(
            pomodoro_config,
            load_json(store.as_ref(), keys::POMODORO_STATS).unwrap_or_default(),
            load_json(store.as_ref(), keys::POMODORO_TIMER),
        );
        let alarms = AlarmScheduler::from_alarms(
            load_json(store.as_ref(), keys::ALARMS).unwrap_or_default(),
        );

        let mut engine = Self {
            clock,
            scheduler,
            store,
            notifier,
            config,
            stopwatch,
            countdown,
            presets,
            pomodoro,
            alarms,
            subs: Subscriptions::default(),
        };
        let now = engine.clock.now();
        engine.sync_subscriptions(now);
        engine
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn stopwatch(&self) -> StopwatchSnapshot {
        self.stopwatch.snapshot(self.clock.now())
    }

    pub fn countdown(&self) -> CountdownSnapshot {
        self.countdown.snapshot(self.clock.now())
    }

    pub fn presets(&self) -> &[SavedPreset] {
        self.presets.list()
    }

    pub fn pomodoro(&self) -> PomodoroSnapshot {
        self.pomodoro.snapshot(self.clock.now())
    }

    pub fn alarms(&self) -> &[AlarmDefinition] {
        self.alarms.alarms()
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        let now = self.clock.now();
        EngineSnapshot {
            stopwatch: self.stopwatch.snapshot(now),
            countdown: self.countdown.snapshot(now),
            presets: self.presets.list().to_vec(),
            pomodoro: self.pomodoro.snapshot(now),
            alarms: self.alarms.alarms().to_vec(),
        }
    }

    /// Subscriptions currently held, alarm included.
    pub fn live_subscriptions(&self) -> usize {
        self.subs.live()
    }

    /// Finest live tick period; drivers wake at this interval.
    pub fn tick_period_ms(&self) -> Option<u64> {
        self.scheduler.min_period_ms()
    }

    // ── Stopwatch ────────────────────────────────────────────────────

    pub fn stopwatch_start(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.stopwatch.start(now);
        self.commit(now, event)
    }

    pub fn stopwatch_pause(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.stopwatch.pause(now);
        self.commit(now, event)
    }

    pub fn stopwatch_reset(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.stopwatch.reset(now);
        self.commit(now, event)
    }

    pub fn stopwatch_lap(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.stopwatch.lap(now);
        self.commit(now, event)
    }

    // ── Countdown ────────────────────────────────────────────────────

    /// Set a new target from user input. Refused while running.
    pub fn countdown_arm(&mut self, input: DurationInput) -> Option<Event> {
        let now = self.clock.now();
        let event = self.countdown.arm(input.total_ms(), now);
        self.commit(now, event)
    }

    pub fn countdown_start(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.countdown.start(now);
        self.commit(now, event)
    }

    pub fn countdown_pause(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.countdown.pause(now);
        self.commit(now, event)
    }

    pub fn countdown_reset(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.countdown.reset(now);
        self.commit(now, event)
    }

    pub fn save_preset(&mut self, name: &str, input: DurationInput) -> Result<Event, ValidationError> {
        let now = self.clock.now();
        let event = self.presets.save(name, input.total_ms(), now)?;
        Ok(self.commit_one(now, event))
    }

    /// Pause the countdown and re-arm it to the preset's duration.
    /// Unknown ids are a no-op.
    pub fn load_preset(&mut self, id: &str) -> Vec<Event> {
        let now = self.clock.now();
        let Some(duration_ms) = self.presets.get(id).map(|p| p.duration_ms) else {
            return Vec::new();
        };
        let mut events: Vec<Event> = self.countdown.pause(now).into_iter().collect();
        self.countdown.arm(duration_ms, now);
        events.push(Event::PresetLoaded {
            id: id.to_string(),
            duration_ms,
            at: now.to_utc(),
        });
        self.commit_all(now, events)
    }

    pub fn delete_preset(&mut self, id: &str) -> Option<Event> {
        let now = self.clock.now();
        let event = self.presets.delete(id, now);
        self.commit(now, event)
    }

    // ── Pomodoro ─────────────────────────────────────────────────────

    pub fn pomodoro_start(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.pomodoro.start(now);
        self.commit(now, event)
    }

    pub fn pomodoro_pause(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.pomodoro.pause(now);
        self.commit(now, event)
    }

    pub fn pomodoro_reset(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.pomodoro.reset(now);
        self.commit(now, event)
    }

    pub fn pomodoro_switch_phase(&mut self, phase: PomodoroPhase) -> Option<Event> {
        let now = self.clock.now();
        let event = self.pomodoro.switch_phase(phase, now);
        self.commit(now, event)
    }

    pub fn pomodoro_set_config(
        &mut self,
        config: PomodoroConfig,
    ) -> Result<Event, ValidationError> {
        let now = self.clock.now();
        let event = self.pomodoro.set_config(config, now)?;
        Ok(self.commit_one(now, event))
    }

    pub fn pomodoro_reset_stats(&mut self) -> Option<Event> {
        let now = self.clock.now();
        let event = self.pomodoro.reset_stats(now);
        self.commit(now, event)
    }

    // ── Alarms ───────────────────────────────────────────────────────

    pub fn alarm_add(
        &mut self,
        time_of_day: &str,
        recurrence_days: BTreeSet<DayTag>,
        label: &str,
    ) -> Result<Event, ValidationError> {
        let now = self.clock.now();
        let event = self.alarms.add(time_of_day, recurrence_days, label, now)?;
        Ok(self.commit_one(now, event))
    }

    pub fn alarm_edit(
        &mut self,
        id: &str,
        time_of_day: &str,
        recurrence_days: BTreeSet<DayTag>,
        label: &str,
    ) -> Result<Option<Event>, ValidationError> {
        let now = self.clock.now();
        let event = self
            .alarms
            .edit(id, time_of_day, recurrence_days, label, now)?;
        Ok(self.commit(now, event))
    }

    pub fn alarm_toggle(&mut self, id: &str) -> Option<Event> {
        let now = self.clock.now();
        let event = self.alarms.toggle(id, now);
        self.commit(now, event)
    }

    pub fn alarm_remove(&mut self, id: &str) -> Option<Event> {
        let now = self.clock.now();
        let event = self.alarms.remove(id, now);
        self.commit(now, event)
    }

    // ── Driving ──────────────────────────────────────────────────────

    /// Route every due subscription to its component.
    /// Returns the events emitted by this tick, in subscription order.
    pub fn tick(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let mut events = Vec::new();
        for id in self.scheduler.due(now) {
            match self.subs.owner(id) {
                // Refresh only; elapsed time is derived on read.
                Some(Slot::Stopwatch) => {}
                Some(Slot::Countdown) => events.extend(self.countdown.tick(now)),
                Some(Slot::Pomodoro) => events.extend(self.pomodoro.tick(now)),
                Some(Slot::Alarm) => events.extend(self.evaluate_alarms(now)),
                None => tracing::debug!(id = id.raw(), "tick for released subscription"),
            }
        }
        self.commit_all(now, events)
    }

    /// Bring running countdowns up to `now` without waiting for their next
    /// scheduled tick. A process resuming persisted state calls this once so
    /// a deadline that passed while it was not running completes immediately.
    pub fn catch_up(&mut self) -> Vec<Event> {
        let now = self.clock.now();
        let mut events = Vec::new();
        events.extend(self.countdown.tick(now));
        events.extend(self.pomodoro.tick(now));
        self.commit_all(now, events)
    }

    /// Replace the runtime configuration. Tick periods take effect
    /// immediately; saved pomodoro settings are left as they are.
    pub fn set_config(&mut self, config: Config) -> Result<(), ConfigError> {
        config.validate()?;
        for slot in Slot::ALL {
            if let Some(id) = self.subs.slot_mut(slot).take() {
                self.scheduler.cancel(id);
            }
        }
        self.config = config;
        let now = self.clock.now();
        self.sync_subscriptions(now);
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn evaluate_alarms(&mut self, now: Instant) -> Vec<Event> {
        let offset = self
            .config
            .clock
            .utc_offset_minutes
            .and_then(|m| FixedOffset::east_opt(m.saturating_mul(60)));
        match offset {
            Some(offset) => self.alarms.evaluate(&now.to_zoned(&offset)),
            None => self.alarms.evaluate(&now.to_zoned(&Local)),
        }
    }

    fn period_ms(&self, slot: Slot) -> u64 {
        let ticks = &self.config.ticks;
        match slot {
            Slot::Stopwatch => ticks.stopwatch_ms,
            Slot::Countdown => ticks.countdown_ms,
            Slot::Pomodoro => ticks.pomodoro_ms,
            Slot::Alarm => ticks.alarm_ms,
        }
    }

    fn sync_subscriptions(&mut self, now: Instant) {
        for slot in Slot::ALL {
            let wanted = match slot {
                Slot::Stopwatch => self.stopwatch.is_running(),
                Slot::Countdown => self.countdown.is_running(),
                Slot::Pomodoro => self.pomodoro.is_running(),
                Slot::Alarm => true,
            };
            let period = self.period_ms(slot);
            let held = self.subs.slot_mut(slot);
            match (wanted, *held) {
                (true, None) => {
                    let id = self.scheduler.subscribe(period, now);
                    tracing::debug!(?slot, id = id.raw(), period, "subscribed");
                    *held = Some(id);
                }
                (false, Some(id)) => {
                    self.scheduler.cancel(id);
                    tracing::debug!(?slot, id = id.raw(), "subscription cancelled");
                    *held = None;
                }
                _ => {}
            }
        }
    }

    fn commit(&mut self, now: Instant, event: Option<Event>) -> Option<Event> {
        self.sync_subscriptions(now);
        if let Some(event) = &event {
            self.dispatch(std::slice::from_ref(event));
        }
        event
    }

    fn commit_one(&mut self, now: Instant, event: Event) -> Event {
        self.sync_subscriptions(now);
        self.dispatch(std::slice::from_ref(&event));
        event
    }

    fn commit_all(&mut self, now: Instant, events: Vec<Event>) -> Vec<Event> {
        self.sync_subscriptions(now);
        self.dispatch(&events);
        events
    }

    /// Persist what the events touched, then hand signals to the notifier.
    fn dispatch(&mut self, events: &[Event]) {
        let touched: BTreeSet<&'static str> = events
            .iter()
            .flat_map(|e| persisted_keys(e).iter().copied())
            .collect();
        for key in touched {
            self.persist(key);
        }

        if !self.config.notifications.enabled {
            return;
        }
        for event in events {
            if let Some(notification) = Notification::from_event(event) {
                self.notifier.notify(&notification);
            }
        }
    }

    fn persist(&mut self, key: &'static str) {
        let blob = match key {
            keys::STOPWATCH => serde_json::to_string(&self.stopwatch),
            keys::COUNTDOWN => serde_json::to_string(&self.countdown),
            keys::SAVED_TIMERS => serde_json::to_string(&self.presets),
            keys::POMODORO_SETTINGS => serde_json::to_string(self.pomodoro.config()),
            keys::POMODORO_STATS => serde_json::to_string(&self.pomodoro.stats()),
            keys::POMODORO_TIMER => serde_json::to_string(self.pomodoro.phase_state()),
            keys::ALARMS => serde_json::to_string(self.alarms.alarms()),
            _ => return,
        };
        match blob {
            Ok(blob) => {
                if let Err(e) = self.store.save(key, &blob) {
                    tracing::warn!(key, error = %e, "failed to persist state");
                }
            }
            Err(e) => tracing::warn!(key, error = %e, "failed to serialize state"),
        }
    }
}

fn persisted_keys(event: &Event) -> &'static [&'static str] {
    match event {
        Event::StopwatchStarted { .. }
        | Event::StopwatchPaused { .. }
        | Event::StopwatchReset { .. }
        | Event::LapRecorded { .. } => &[keys::STOPWATCH],
        Event::CountdownArmed { .. }
        | Event::CountdownStarted { .. }
        | Event::CountdownPaused { .. }
        | Event::CountdownReset { .. }
        | Event::CountdownCompleted { .. }
        | Event::PresetLoaded { .. } => &[keys::COUNTDOWN],
        Event::PresetSaved { .. } | Event::PresetDeleted { .. } => &[keys::SAVED_TIMERS],
        Event::PhaseStarted { .. }
        | Event::PhasePaused { .. }
        | Event::PhaseReset { .. }
        | Event::PhaseSwitched { .. } => &[keys::POMODORO_TIMER],
        Event::PhaseCompleted { .. } => &[keys::POMODORO_TIMER, keys::POMODORO_STATS],
        Event::PomodoroConfigChanged { .. } => &[keys::POMODORO_SETTINGS, keys::POMODORO_TIMER],
        Event::PomodoroStatsReset { .. } => &[keys::POMODORO_STATS],
        Event::AlarmAdded { .. }
        | Event::AlarmUpdated { .. }
        | Event::AlarmToggled { .. }
        | Event::AlarmRemoved { .. } => &[keys::ALARMS],
        Event::AlarmFired { .. } => &[],
    }
}

fn load_json<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let blob = match store.load(key) {
        Ok(blob) => blob?,
        Err(e) => {
            tracing::warn!(key, error = %e, "failed to load state");
            return None;
        }
    };
    match serde_json::from_str(&blob) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(key, error = %e, "ignoring malformed saved state");
            None
        }
    }
}
