//! # Horologe Core Library
//!
//! Time-keeping engine behind the Horologe clock suite: a stopwatch with laps,
//! a countdown timer with saved presets, a pomodoro cycle machine and a
//! recurring alarm scheduler. Front ends (the `horologe-cli` binary, or any
//! other UI) read snapshots and forward user commands; the engine never renders
//! anything itself.
//!
//! ## Architecture
//!
//! - **Components**: wall-clock state machines that take the current
//!   [`Instant`] on every call and derive elapsed/remaining time from an anchor,
//!   so refresh rate never affects what they measure
//! - **Engine**: owns the components plus the injected [`Clock`],
//!   [`IntervalScheduler`], [`KeyValueStore`] and [`Notifier`]
//! - **Storage**: SQLite key-value snapshots and TOML configuration
//!
//! ## Key Components
//!
//! - [`Engine`]: command surface and tick dispatch
//! - [`Stopwatch`], [`Countdown`], [`Pomodoro`], [`AlarmScheduler`]
//! - [`Database`]: persistent snapshot store
//! - [`Config`]: application configuration management

pub mod alarm;
pub mod clock;
pub mod display;
pub mod engine;
pub mod error;
pub mod events;
pub mod notify;
pub mod scheduler;
pub mod storage;
pub mod timer;

pub use alarm::{AlarmDefinition, AlarmScheduler, DayTag, TimeOfDay};
pub use clock::{Clock, Instant, ManualClock, SystemClock};
pub use engine::{Engine, EngineSnapshot};
pub use error::{ConfigError, CoreError, StoreError, ValidationError};
pub use events::Event;
pub use notify::{LogNotifier, Notification, NotificationKind, Notifier, SilentNotifier};
pub use scheduler::{IntervalScheduler, SubscriptionId, TickScheduler};
pub use storage::{Config, Database, KeyValueStore, MemoryStore};
pub use timer::{
    Countdown, DurationInput, Lap, Pomodoro, PomodoroConfig, PomodoroPhase, PomodoroStats,
    SavedPreset, Stopwatch,
};
