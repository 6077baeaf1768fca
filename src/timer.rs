//! Logical-clock timers with cancellation handles.
//!
//! Nothing here sleeps. The owner advances the clock and pulls due timers
//! one at a time, so a handler can cancel or reschedule other timers before
//! they get a chance to fire.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Debug)]
struct Entry<K> {
    id: TimerId,
    kind: K,
    due: Duration,
    period: Option<Duration>,
}

#[derive(Clone, Debug)]
pub struct Timers<K> {
    now: Duration,
    next_id: u64,
    entries: Vec<Entry<K>>,
}

impl<K> Default for Timers<K> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 0,
            entries: Vec::new(),
        }
    }
}

impl<K: Copy> Timers<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now(&self) -> Duration {
        self.now
    }

    /// Fires once, `delay` after the current time.
    pub fn schedule_once(&mut self, kind: K, delay: Duration) -> TimerId {
        self.push(kind, delay, None)
    }

    /// Fires every `period`, first one `period` from now. A zero period is
    /// clamped to one millisecond so the clock always makes progress.
    pub fn schedule_every(&mut self, kind: K, period: Duration) -> TimerId {
        let period = period.max(Duration::from_millis(1));
        self.push(kind, period, Some(period))
    }

    /// Returns false when the timer already fired (one-shot) or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        self.entries.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    pub fn pending(&self) -> usize {
        self.entries.len()
    }

    /// Pops the earliest timer due at or before `until`, moving the clock to
    /// its deadline. Ties fire in scheduling order. Repeating timers are
    /// re-armed one period later.
    pub fn pop_due(&mut self, until: Duration) -> Option<(TimerId, K)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due <= until)
            .min_by_key(|(_, e)| (e.due, e.id))
            .map(|(idx, _)| idx)?;

        let entry = &mut self.entries[idx];
        let fired = (entry.id, entry.kind);
        self.now = self.now.max(entry.due);
        match entry.period {
            Some(period) => entry.due += period,
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some(fired)
    }

    /// Moves the clock forward without firing anything.
    pub fn set_now(&mut self, now: Duration) {
        self.now = self.now.max(now);
    }

    fn push(&mut self, kind: K, delay: Duration, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            kind,
            due: self.now + delay,
            period,
        });
        id
    }
}
