//! Notification collaborator.
//!
//! The engine never plays sounds or raises OS notifications itself. It hands a
//! [`Notification`] to a [`Notifier`] after the triggering state transition has
//! already been committed, so a failing notifier cannot affect the engine.

use serde::{Deserialize, Serialize};

use crate::events::Event;

pub const DEFAULT_ALARM_LABEL: &str = "Time to wake up!";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    CountdownCompleted,
    PhaseCompleted,
    AlarmFired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub label: Option<String>,
}

impl Notification {
    /// The notification an event should raise, if any.
    pub fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::CountdownCompleted { .. } => Some(Self {
                kind: NotificationKind::CountdownCompleted,
                label: None,
            }),
            Event::PhaseCompleted { next_phase, .. } => Some(Self {
                kind: NotificationKind::PhaseCompleted,
                label: Some(next_phase.label().to_string()),
            }),
            Event::AlarmFired { label, .. } => Some(Self {
                kind: NotificationKind::AlarmFired,
                label: Some(if label.is_empty() {
                    DEFAULT_ALARM_LABEL.to_string()
                } else {
                    label.clone()
                }),
            }),
            _ => None,
        }
    }
}

pub trait Notifier: Send {
    fn notify(&mut self, notification: &Notification);
}

/// Writes notifications to the tracing log.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&mut self, notification: &Notification) {
        tracing::info!(
            kind = ?notification.kind,
            label = notification.label.as_deref().unwrap_or(""),
            "notification"
        );
    }
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&mut self, _notification: &Notification) {}
}
