//! Deterministic timer queue driven by an explicit clock.
//!
//! The game never sleeps or spawns threads for its timers; the frame loop
//! passes `Instant::now()` to [`Scheduler::drain_due`] and whatever has come
//! due is handed back in firing order.

use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerKind {
    /// Toggles trap visibility and re-arms itself. Only acts while `epoch` is
    /// still the live level.
    Blink { epoch: u64 },
    /// Ends the freeze.
    Thaw { token: u64 },
    /// Releases the trap message lock.
    ReleaseMessage { token: u64 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Timer {
    pub due: Instant,
    pub kind: TimerKind,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    pending: Vec<Timer>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, now: Instant, after: Duration, kind: TimerKind) {
        self.pending.push(Timer {
            due: now + after,
            kind,
        });
    }

    pub fn schedule_at(&mut self, due: Instant, kind: TimerKind) {
        self.pending.push(Timer { due, kind });
    }

    /// Removes and returns every timer due at or before `now`, earliest first.
    /// Timers sharing a deadline keep their scheduling order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<Timer> {
        let mut due = Vec::new();
        let mut idx = 0;
        while idx < self.pending.len() {
            if self.pending[idx].due <= now {
                due.push(self.pending.remove(idx));
            } else {
                idx += 1;
            }
        }
        due.sort_by_key(|t| t.due);
        due
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.pending.iter().map(|t| t.due).min()
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
