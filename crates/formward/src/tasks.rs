//! Deferred work on a virtual clock
//!
//! The host drives time explicitly. Tasks due at the same instant run in
//! the order they were scheduled, so a zero-delay task always runs before a
//! timed one scheduled later for the same turn.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Shared monotonic clock in milliseconds. Clones observe the same time.
#[derive(Debug, Clone, Default)]
pub struct Clock {
    millis: Arc<AtomicU64>,
}

impl Clock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        Duration::from_millis(self.millis.load(Ordering::SeqCst))
    }

    pub fn advance(&self, by: Duration) {
        self.millis.fetch_add(as_millis(by), Ordering::SeqCst);
    }

    /// Move forward to `at`. Never moves backwards.
    pub fn advance_to(&self, at: Duration) {
        self.millis.fetch_max(as_millis(at), Ordering::SeqCst);
    }
}

fn as_millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Ordered queue of tasks keyed by due time then insertion order
#[derive(Debug)]
pub struct TaskQueue<T> {
    clock: Clock,
    seq: u64,
    pending: BTreeMap<(Duration, u64), T>,
}

impl<T> TaskQueue<T> {
    pub fn new(clock: Clock) -> Self {
        Self {
            clock,
            seq: 0,
            pending: BTreeMap::new(),
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Run on the next turn
    pub fn defer(&mut self, task: T) {
        self.schedule(Duration::ZERO, task);
    }

    pub fn schedule(&mut self, delay: Duration, task: T) {
        let due = self.clock.now() + delay;
        self.seq += 1;
        self.pending.insert((due, self.seq), task);
    }

    pub fn next_due(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(due, _)| *due)
    }

    /// Deadline `by` from now
    pub fn deadline(&self, by: Duration) -> Duration {
        self.clock.now() + by
    }

    /// Pop the earliest task due at or before `deadline`, moving the clock
    /// to that task's due time first.
    pub fn pop_until(&mut self, deadline: Duration) -> Option<T> {
        let (due, _) = *self.pending.keys().next()?;
        if due > deadline {
            return None;
        }
        self.clock.advance_to(due);
        self.pending.pop_first().map(|(_, task)| task)
    }

    /// Move the clock forward by `by` and return the tasks that fell due,
    /// in order.
    pub fn advance(&mut self, by: Duration) -> Vec<T> {
        let deadline = self.deadline(by);
        let mut due = Vec::new();
        while let Some(task) = self.pop_until(deadline) {
            due.push(task);
        }
        self.clock.advance_to(deadline);
        due
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}
