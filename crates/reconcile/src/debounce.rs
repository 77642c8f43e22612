//! Trailing-edge debounce timer on a caller-supplied clock.
//!
//! Every `schedule` supersedes the pending value and pushes the deadline
//! out; only the latest scheduled value is ever delivered.

use std::time::Duration;

use tokio::time::Instant;

#[derive(Debug)]
struct Pending<T> {
    token: u64,
    deadline: Instant,
    value: T,
}

#[derive(Debug)]
pub struct Debouncer<T> {
    window: Duration,
    seq: u64,
    pending: Option<Pending<T>>,
}

impl<T> Debouncer<T> {
    #[must_use]
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            seq: 0,
            pending: None,
        }
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.window
    }

    /// Replace any pending value; returns the new token.
    pub fn schedule(&mut self, now: Instant, value: T) -> u64 {
        self.seq += 1;
        self.pending = Some(Pending {
            token: self.seq,
            deadline: now + self.window,
            value,
        });
        self.seq
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|p| p.value)
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    #[must_use]
    pub fn pending(&self) -> Option<&T> {
        self.pending.as_ref().map(|p| &p.value)
    }

    /// Token of the pending value.
    #[must_use]
    pub fn token(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.token)
    }

    /// Take the pending value once its deadline has passed.
    pub fn fire(&mut self, now: Instant) -> Option<T> {
        if self.deadline().is_some_and(|deadline| deadline <= now) {
            self.cancel()
        } else {
            None
        }
    }
}
