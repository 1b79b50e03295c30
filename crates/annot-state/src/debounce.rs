//! Debounced write scheduling
//!
//! At most one write is pending. Each mutation replaces the pending
//! deadline with `now + window`, so a burst of edits produces one write
//! after the burst goes quiet. The write always persists whatever state is
//! current when it fires.

use crate::model::Timestamp;

/// Default quiet period before a write
pub const DEFAULT_DEBOUNCE_MS: i64 = 250;

/// Single pending-write scheduler
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: i64,
    deadline: Option<Timestamp>,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE_MS)
    }
}

impl Debouncer {
    /// Scheduler with a quiet period of `window_ms`
    #[must_use]
    pub fn new(window_ms: i64) -> Self {
        Self {
            window_ms: window_ms.max(0),
            deadline: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn window_ms(&self) -> i64 {
        self.window_ms
    }

    /// Replace any pending write with one due at `now + window`
    pub fn schedule(&mut self, now: Timestamp) {
        self.deadline = Some(now.saturating_add(self.window_ms));
    }

    /// Deadline of the pending write
    #[inline]
    #[must_use]
    pub fn pending(&self) -> Option<Timestamp> {
        self.deadline
    }

    /// Whether the pending write is due at `now`
    #[must_use]
    pub fn is_due(&self, now: Timestamp) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }

    /// Consume the pending write if it is due
    pub fn take_due(&mut self, now: Timestamp) -> bool {
        if self.is_due(now) {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    /// Consume the pending write regardless of its deadline
    pub fn take_pending(&mut self) -> bool {
        self.deadline.take().is_some()
    }

    /// Drop the pending write
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}
