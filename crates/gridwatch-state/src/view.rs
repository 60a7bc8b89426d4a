//! Published state of one polled view.

use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

/// Outcome history of a view's polls.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollHealth {
    /// Failures since the last successful poll
    pub consecutive_failures: u32,
    pub total_failures: u64,
    pub last_error: Option<String>,
    pub last_success: Option<DateTime<Utc>>,
    pub last_failure: Option<DateTime<Utc>>,
}

impl PollHealth {
    pub fn record_success(&mut self, at: DateTime<Utc>) {
        self.consecutive_failures = 0;
        self.last_error = None;
        self.last_success = Some(at);
    }

    pub fn record_failure(&mut self, error: impl Into<String>, at: DateTime<Utc>) {
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
        self.total_failures += 1;
        self.last_error = Some(error.into());
        self.last_failure = Some(at);
    }

    /// The most recent poll succeeded (or none has failed yet).
    pub fn is_healthy(&self) -> bool {
        self.consecutive_failures == 0
    }
}

/// The snapshot currently shown by a view, swapped whole on each applied poll.
///
/// A failed poll only touches `health`; the snapshot stays the last good one.
#[derive(Debug)]
pub struct ViewState<S> {
    pub snapshot: Arc<S>,
    /// Wall-clock time of the fetch that produced `snapshot`, `None` until the
    /// first success
    pub fetched_at: Option<DateTime<Utc>>,
    /// Request number of the applied response, 0 before any
    pub sequence: u64,
    pub health: PollHealth,
}

impl<S> ViewState<S> {
    pub fn new(initial: S) -> Self {
        Self {
            snapshot: Arc::new(initial),
            fetched_at: None,
            sequence: 0,
            health: PollHealth::default(),
        }
    }

    /// Replace the snapshot with the response to request `sequence`.
    pub fn apply(&mut self, snapshot: S, sequence: u64, at: DateTime<Utc>) {
        self.snapshot = Arc::new(snapshot);
        self.sequence = sequence;
        self.fetched_at = Some(at);
        self.health.record_success(at);
    }

    pub fn has_data(&self) -> bool {
        self.fetched_at.is_some()
    }

    /// Time since the shown snapshot was fetched.
    pub fn age(&self, now: DateTime<Utc>) -> Option<Duration> {
        self.fetched_at.map(|at| now - at)
    }

    /// Data exists but the latest poll failed.
    pub fn is_stale(&self) -> bool {
        self.has_data() && !self.health.is_healthy()
    }
}

impl<S: Default> Default for ViewState<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S> Clone for ViewState<S> {
    fn clone(&self) -> Self {
        Self {
            snapshot: Arc::clone(&self.snapshot),
            fetched_at: self.fetched_at,
            sequence: self.sequence,
            health: self.health.clone(),
        }
    }
}
