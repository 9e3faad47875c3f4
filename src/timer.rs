//! Fire-once timers owned by the component that scheduled them
//!
//! Timers carry a payload instead of a closure, so firing one is just
//! handing the payload back to its owner on the same sequential path that
//! handles touch events. Nothing outlives the queue: dropping it drops every
//! pending timer without firing.
//!
//! ## Key Features:
//! - **Explicit time**: callers pass millisecond timestamps, no clock reads
//! - **Stable ordering**: due timers fire by deadline, ties in schedule order
//! - **Cancellable**: by handle, or all at once on teardown

use std::collections::BTreeMap;
use std::time::Instant;

/// Handle to a pending timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle {
    deadline: u64,
    seq: u64,
}

impl TimerHandle {
    /// Timestamp (ms) at which this timer becomes due
    pub fn deadline(&self) -> u64 {
        self.deadline
    }
}

/// Deadline-ordered queue of pending payloads
#[derive(Debug)]
pub struct TimerQueue<T> {
    pending: BTreeMap<TimerHandle, T>,
    next_seq: u64,
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_seq: 0,
        }
    }

    /// Schedule `payload` to become due `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64, payload: T) -> TimerHandle {
        let handle = TimerHandle {
            deadline: now_ms.saturating_add(delay_ms),
            seq: self.next_seq,
        };
        self.next_seq += 1;
        self.pending.insert(handle, payload);
        handle
    }

    /// Cancel one timer. Returns its payload if it was still pending.
    pub fn cancel(&mut self, handle: TimerHandle) -> Option<T> {
        self.pending.remove(&handle)
    }

    /// Drop every pending timer without firing
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Remove and return the earliest timer due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: u64) -> Option<T> {
        let (&handle, _) = self.pending.first_key_value()?;
        if handle.deadline > now_ms {
            return None;
        }
        self.pending.remove(&handle)
    }

    /// Deadline of the earliest pending timer
    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.keys().next().map(|h| h.deadline)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Monotonic millisecond clock for live input loops
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start_instant: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            start_instant: Instant::now(),
        }
    }

    /// Milliseconds since the clock was created
    pub fn now_ms(&self) -> u64 {
        self.start_instant.elapsed().as_millis() as u64
    }

    /// Convert a timestamp from this clock back into an `Instant`
    pub fn instant_at(&self, ms: u64) -> Instant {
        self.start_instant + std::time::Duration::from_millis(ms)
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}
