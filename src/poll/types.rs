//! Polling types and configuration

use chrono::{DateTime, Utc};
use std::time::Duration;

/// Scheduling policy for a polling loop
///
/// The two consumers need different resilience behavior: the UI-facing event
/// list refreshes on a fixed cadence and tolerates failed cycles, while the
/// alert loop backs off to avoid hammering an unhealthy feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPolicy {
    /// Re-fetch a fixed interval after the previous fetch was issued,
    /// silently skipping a cycle if that fetch is still in flight
    FixedInterval,
    /// Re-fetch a fixed interval after the previous fetch completed
    /// successfully; exponential backoff between failed attempts
    Backoff,
}

/// Polling loop configuration
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Scheduling policy
    pub policy: PollPolicy,
    /// Base interval between fetches
    pub interval: Duration,
    /// First retry delay after a failure (Backoff policy)
    pub initial_backoff: Duration,
    /// Ceiling for retry delays (Backoff policy)
    pub max_backoff: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            policy: PollPolicy::FixedInterval,
            interval: Duration::from_secs(30),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl PollConfig {
    /// Create a config for the given policy with default timings
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            ..Default::default()
        }
    }

    /// Set the base fetch interval
    pub fn interval(mut self, d: Duration) -> Self {
        self.interval = d;
        self
    }

    /// Set the initial retry delay
    pub fn initial_backoff(mut self, d: Duration) -> Self {
        self.initial_backoff = d;
        self
    }

    /// Set the retry delay ceiling
    pub fn max_backoff(mut self, d: Duration) -> Self {
        self.max_backoff = d;
        self
    }
}

/// Per-loop polling state
///
/// Invariant: at most one fetch active at any instant for a given instance.
#[derive(Debug, Clone, Default)]
pub struct PollState {
    in_flight: bool,
    consecutive_failures: u32,
    backoff: Option<Duration>,
    last_success_at: Option<DateTime<Utc>>,
}

impl PollState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a fetch as issued. Returns false (and changes nothing) if one
    /// is already in flight.
    pub fn try_begin(&mut self) -> bool {
        if self.in_flight {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Record a successful fetch: clears the failure streak and backoff
    pub fn complete_success(&mut self, now: DateTime<Utc>) {
        self.in_flight = false;
        self.consecutive_failures = 0;
        self.backoff = None;
        self.last_success_at = Some(now);
    }

    /// Record a failed fetch
    pub fn complete_failure(&mut self) {
        self.in_flight = false;
        self.consecutive_failures = self.consecutive_failures.saturating_add(1);
    }

    /// Compute and store the delay before the next attempt:
    /// `min(initial * 2^(n-1), max)` for the nth consecutive failure
    pub fn schedule_backoff(&mut self, initial: Duration, max: Duration) -> Duration {
        let exponent = self.consecutive_failures.saturating_sub(1).min(32);
        let delay = initial.saturating_mul(2u32.saturating_pow(exponent)).min(max);
        self.backoff = Some(delay);
        delay
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn consecutive_failures(&self) -> u32 {
        self.consecutive_failures
    }

    pub fn backoff(&self) -> Option<Duration> {
        self.backoff
    }

    pub fn last_success_at(&self) -> Option<DateTime<Utc>> {
        self.last_success_at
    }
}

/// One cycle's outcome, surfaced to the loop's consumer
#[derive(Debug)]
pub enum PollUpdate<T> {
    /// A fetch completed and its results are current
    Completed {
        batch: T,
        at: DateTime<Utc>,
    },
    /// A fetch failed; the loop keeps running
    Failed {
        error: String,
        /// Consecutive-failure count including this one
        attempt: u32,
        /// Delay before the next attempt (None under FixedInterval, where
        /// the next tick is unaffected by the failure)
        retry_in: Option<Duration>,
    },
}
