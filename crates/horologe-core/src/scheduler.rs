//! Interval scheduler.
//!
//! A repeating-tick abstraction over the host's timing primitive. The engine
//! subscribes once per running timer and polls [`IntervalScheduler::due`] from
//! its loop; each due subscription is routed to the timer that owns it.
//!
//! Missed deadlines are coalesced into a single due report: timers derive
//! their state from anchors, so a late tick loses nothing.

use std::collections::BTreeMap;

use crate::clock::Instant;

/// Handle for a live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn raw(self) -> u64 {
        self.0
    }
}

pub trait IntervalScheduler: Send {
    /// Register a repeating tick every `period_ms`, first due one period after `now`.
    fn subscribe(&mut self, period_ms: u64, now: Instant) -> SubscriptionId;

    /// Drop a subscription. Unknown handles are ignored.
    fn cancel(&mut self, id: SubscriptionId);

    /// Subscriptions whose deadline has passed at `now`, in handle order.
    fn due(&mut self, now: Instant) -> Vec<SubscriptionId>;

    /// Shortest live period, used by drivers to size their wake-up interval.
    fn min_period_ms(&self) -> Option<u64>;
}

#[derive(Debug, Clone)]
struct Entry {
    period_ms: u64,
    next_due: Instant,
}

/// Deadline-table scheduler.
#[derive(Debug, Default)]
pub struct TickScheduler {
    next_id: u64,
    entries: BTreeMap<SubscriptionId, Entry>,
}

impl TickScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.entries.len()
    }
}

impl IntervalScheduler for TickScheduler {
    fn subscribe(&mut self, period_ms: u64, now: Instant) -> SubscriptionId {
        let period_ms = period_ms.max(1);
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.entries.insert(
            id,
            Entry {
                period_ms,
                next_due: now.saturating_add(period_ms),
            },
        );
        id
    }

    fn cancel(&mut self, id: SubscriptionId) {
        self.entries.remove(&id);
    }

    fn due(&mut self, now: Instant) -> Vec<SubscriptionId> {
        let mut fired = Vec::new();
        for (id, entry) in self.entries.iter_mut() {
            if entry.next_due > now {
                continue;
            }
            fired.push(*id);
            let late = now.saturating_since(entry.next_due);
            let skipped = late / entry.period_ms;
            entry.next_due = entry
                .next_due
                .saturating_add((skipped + 1).saturating_mul(entry.period_ms));
        }
        fired
    }

    fn min_period_ms(&self) -> Option<u64> {
        self.entries.values().map(|e| e.period_ms).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(ms: u64) -> Instant {
        Instant::from_millis(ms)
    }

    #[test]
    fn fires_once_per_period() {
        let mut sched = TickScheduler::new();
        let id = sched.subscribe(1_000, at(0));
        assert!(sched.due(at(999)).is_empty());
        assert_eq!(sched.due(at(1_000)), vec![id]);
        assert!(sched.due(at(1_500)).is_empty());
        assert_eq!(sched.due(at(2_000)), vec![id]);
    }

    #[test]
    fn missed_deadlines_coalesce() {
        let mut sched = TickScheduler::new();
        let id = sched.subscribe(100, at(0));
        assert_eq!(sched.due(at(1_050)), vec![id]);
        assert!(sched.due(at(1_099)).is_empty());
        assert_eq!(sched.due(at(1_100)), vec![id]);
    }

    #[test]
    fn cancelled_subscription_never_fires() {
        let mut sched = TickScheduler::new();
        let id = sched.subscribe(10, at(0));
        sched.cancel(id);
        assert!(sched.due(at(1_000)).is_empty());
        assert_eq!(sched.live(), 0);
        assert_eq!(sched.min_period_ms(), None);
    }

    #[test]
    fn handles_are_not_reused() {
        let mut sched = TickScheduler::new();
        let a = sched.subscribe(10, at(0));
        sched.cancel(a);
        let b = sched.subscribe(10, at(0));
        assert_ne!(a, b);
    }
}
