//! Delay-then-fire scheduling for writes that arrive in bursts, such as
//! row heights during a resize drag.
//!
//! Callers pass `now` explicitly so the owner's event loop decides when
//! to poll.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

/// Fires once `delay` has passed since the last trigger.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    last_event: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay_ms: u64) -> Self {
        Self { delay: Duration::from_millis(delay_ms), last_event: None }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.last_event = Some(now);
    }

    /// True once per trigger burst, when the delay has elapsed.
    pub fn should_execute(&mut self, now: Instant) -> bool {
        match self.last_event {
            Some(last) if now.saturating_duration_since(last) >= self.delay => {
                self.last_event = None;
                true
            }
            _ => false,
        }
    }

    pub fn time_remaining(&self, now: Instant) -> Option<Duration> {
        self.last_event
            .map(|last| self.delay.saturating_sub(now.saturating_duration_since(last)))
    }

    pub fn cancel(&mut self) {
        self.last_event = None;
    }

    pub fn is_pending(&self) -> bool {
        self.last_event.is_some()
    }
}

/// Latest value per key, released after a quiet period per key. Each
/// key runs its own [`Debouncer`].
#[derive(Debug, Clone)]
pub struct DebouncedWrites<K, V> {
    delay_ms: u64,
    pending: HashMap<K, (V, Debouncer)>,
}

impl<K: Eq + Hash + Clone, V> DebouncedWrites<K, V> {
    pub fn new(delay_ms: u64) -> Self {
        Self { delay_ms, pending: HashMap::new() }
    }

    /// Replace any pending value for `key` and restart its delay.
    pub fn schedule(&mut self, key: K, value: V, now: Instant) {
        let mut debouncer = match self.pending.remove(&key) {
            Some((_, debouncer)) => debouncer,
            None => Debouncer::new(self.delay_ms),
        };
        debouncer.trigger(now);
        self.pending.insert(key, (value, debouncer));
    }

    pub fn cancel(&mut self, key: &K) -> Option<V> {
        self.pending.remove(key).map(|(v, _)| v)
    }

    /// Remove and return every entry whose delay has elapsed.
    pub fn due(&mut self, now: Instant) -> Vec<(K, V)> {
        let ready: Vec<K> = self
            .pending
            .iter_mut()
            .filter_map(|(k, (_, debouncer))| debouncer.should_execute(now).then(|| k.clone()))
            .collect();
        ready
            .into_iter()
            .filter_map(|k| self.pending.remove(&k).map(|(v, _)| (k, v)))
            .collect()
    }

    /// Everything pending, regardless of timing (on close).
    pub fn flush(&mut self) -> Vec<(K, V)> {
        self.pending.drain().map(|(k, (v, _))| (k, v)).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
