//! Timer queue: owned, cancellable one-shot timers on a virtual clock.
//!
//! Every animated component owns exactly one `TimerQueue`. Timers are plain
//! data inside that queue, so there is no callback that can outlive its
//! owner: clearing the queue (or dropping the owner) is the cancellation.
//!
//! Time is a [`Duration`] measured from an arbitrary origin chosen by the
//! host loop. The queue never reads a wall clock itself.

use std::time::Duration;

/// Handle to a scheduled timer, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A pending timer.
#[derive(Debug, Clone)]
struct Timer<E> {
    id: TimerId,
    due: Duration,
    event: E,
}

/// A small queue of one-shot timers carrying events of type `E`.
///
/// Due timers are delivered earliest first; timers due at the same instant
/// are delivered in scheduling order. Periodic behaviour is expressed by the
/// owner rescheduling from inside its event handler.
#[derive(Debug, Clone)]
pub struct TimerQueue<E> {
    timers: Vec<Timer<E>>,
    next_id: u64,
}

impl<E> TimerQueue<E> {
    /// Create an empty queue.
    pub const fn new() -> Self {
        Self {
            timers: Vec::new(),
            next_id: 0,
        }
    }

    /// Schedule `event` to fire at `due`.
    pub fn schedule(&mut self, due: Duration, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer { id, due, event });
        id
    }

    /// Cancel a pending timer.
    ///
    /// Returns `false` if the timer already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    /// Cancel every pending timer, returning how many were dropped.
    pub fn clear(&mut self) -> usize {
        let dropped = self.timers.len();
        self.timers.clear();
        dropped
    }

    /// Earliest pending due time, if any.
    pub fn next_due(&self) -> Option<Duration> {
        self.timers.iter().map(|timer| timer.due).min()
    }

    /// Remove and return the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, E)> {
        let index = self
            .timers
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due <= now)
            .min_by_key(|(_, timer)| (timer.due, timer.id))
            .map(|(index, _)| index)?;

        let timer = self.timers.swap_remove(index);
        Some((timer.due, timer.event))
    }

    /// Number of pending timers.
    #[inline]
    pub fn len(&self) -> usize {
        self.timers.len()
    }

    /// Check if no timers are pending.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

impl<E> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}
