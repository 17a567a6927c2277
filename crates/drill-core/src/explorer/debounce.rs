//! Single-slot debounce timers.
//!
//! Each key holds at most one deadline; scheduling again replaces it. The
//! explorer's event loop sleeps until [`Debouncer::next_deadline`] and then
//! takes the expired keys.

use crate::types::NodeId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// A node's scoped search box.
    Scoped(NodeId),
    /// The global search box.
    Global,
}

#[derive(Debug, Default)]
pub struct Debouncer {
    deadlines: HashMap<TimerKey, Instant>,
}

impl Debouncer {
    /// (Re)arm `key` to fire `delay` from now.
    pub fn schedule(&mut self, key: TimerKey, delay: Duration) {
        self.deadlines.insert(key, Instant::now() + delay);
    }

    /// Disarm `key`. Returns whether a timer was pending.
    pub fn cancel(&mut self, key: &TimerKey) -> bool {
        self.deadlines.remove(key).is_some()
    }

    pub fn is_pending(&self, key: &TimerKey) -> bool {
        self.deadlines.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    pub fn clear(&mut self) {
        self.deadlines.clear();
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.deadlines.values().min().copied()
    }

    /// Remove and return every key whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_expired(&mut self, now: Instant) -> Vec<TimerKey> {
        let mut due: Vec<(Instant, TimerKey)> = self
            .deadlines
            .iter()
            .filter(|(_, at)| **at <= now)
            .map(|(key, at)| (*at, key.clone()))
            .collect();
        due.sort_by_key(|(at, _)| *at);
        for (_, key) in &due {
            self.deadlines.remove(key);
        }
        due.into_iter().map(|(_, key)| key).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn rescheduling_replaces_the_deadline() {
        let mut timers = Debouncer::default();
        timers.schedule(TimerKey::Global, Duration::from_millis(300));
        tokio::time::advance(Duration::from_millis(200)).await;
        timers.schedule(TimerKey::Global, Duration::from_millis(300));
        tokio::time::advance(Duration::from_millis(200)).await;

        assert!(timers.take_expired(Instant::now()).is_empty());
        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(timers.take_expired(Instant::now()), vec![TimerKey::Global]);
        assert!(timers.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn keys_are_independent() {
        let mut timers = Debouncer::default();
        let a = TimerKey::Scoped(NodeId::root("vertical", "Apparel"));
        let b = TimerKey::Scoped(NodeId::root("vertical", "Home"));
        timers.schedule(a.clone(), Duration::from_millis(100));
        timers.schedule(b.clone(), Duration::from_millis(50));
        assert!(timers.cancel(&a));
        assert!(!timers.cancel(&a));

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_eq!(timers.take_expired(Instant::now()), vec![b]);
    }
}
