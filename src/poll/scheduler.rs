//! Polling scheduler with cancellation and stale-result discard

use super::types::{PollConfig, PollPolicy, PollState, PollUpdate};
use super::PollTask;
use chrono::Utc;
use tokio::sync::{mpsc, watch};
use tokio::time::{interval, sleep, MissedTickBehavior};

/// Drives a [`PollTask`] on a cadence
///
/// Each started loop runs its fetches strictly sequentially (Idle ->
/// Fetching -> Succeeded/Failed -> Idle) until cancelled. Results whose
/// parameter fingerprint changed while the fetch was in flight are
/// discarded without emission.
pub struct PollScheduler;

/// Handle owning a started polling loop
///
/// Dropping the handle also stops the loop.
pub struct PollHandle {
    stop: watch::Sender<bool>,
}

impl PollHandle {
    /// Stop the loop: no further timers fire after this returns.
    ///
    /// Idempotent, and safe to call before any fetch has occurred. An
    /// already-in-flight fetch is not aborted; its result is discarded
    /// when it resolves.
    pub fn stop(&self) {
        let _ = self.stop.send(true);
    }

    /// Whether stop has been requested
    pub fn is_stopped(&self) -> bool {
        *self.stop.borrow()
    }
}

impl PollScheduler {
    /// Start a polling loop for the task
    ///
    /// Begins immediately with one fetch, then schedules subsequent fetches
    /// per the configured policy. Returns the loop handle and the update
    /// stream; dropping the receiver also winds the loop down.
    pub fn start<T: PollTask>(
        task: T,
        config: PollConfig,
    ) -> (PollHandle, mpsc::Receiver<PollUpdate<T::Output>>) {
        let (tx, rx) = mpsc::channel(64);
        let (stop_tx, stop_rx) = watch::channel(false);

        tokio::spawn(async move {
            match config.policy {
                PollPolicy::FixedInterval => Self::run_fixed_loop(task, config, tx, stop_rx).await,
                PollPolicy::Backoff => Self::run_backoff_loop(task, config, tx, stop_rx).await,
            }
        });

        (PollHandle { stop: stop_tx }, rx)
    }

    /// Fixed-interval loop: ticks relative to fetch issue time, skipping
    /// ticks that would overlap an in-flight fetch
    async fn run_fixed_loop<T: PollTask>(
        task: T,
        config: PollConfig,
        tx: mpsc::Sender<PollUpdate<T::Output>>,
        mut stop_rx: watch::Receiver<bool>,
    ) {
        let mut state = PollState::new();
        let mut ticker = interval(config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = cancelled(&mut stop_rx) => break,
            }

            if !state.try_begin() {
                continue;
            }

            let fingerprint = task.fingerprint();
            let result = task.poll().await;
            let now = Utc::now();

            if *stop_rx.borrow() {
                // Cancelled while the fetch was in flight: discard.
                break;
            }

            match result {
                Ok(batch) => {
                    state.complete_success(now);

                    if task.fingerprint() != fingerprint {
                        tracing::debug!("Discarding poll results: parameters changed mid-flight");
                        continue;
                    }

                    if tx.send(PollUpdate::Completed { batch, at: now }).await.is_err() {
                        tracing::debug!("Update receiver dropped, stopping poll loop");
                        break;
                    }
                }
                Err(e) => {
                    state.complete_failure();
                    tracing::warn!(
                        error = %e,
                        attempt = state.consecutive_failures(),
                        "Poll cycle failed"
                    );

                    let update = PollUpdate::Failed {
                        error: e.to_string(),
                        attempt: state.consecutive_failures(),
                        retry_in: None,
                    };
                    if tx.send(update).await.is_err() {
                        break;
                    }
                }
            }
        }
    }

    /// Backoff loop: re-fetches a fixed interval after success, doubling
    /// the delay after each consecutive failure up to the ceiling
    async fn run_backoff_loop<T: PollTask>(
        task: T,
        config: PollConfig,
        tx: mpsc::Sender<PollUpdate<T::Output>>,
        mut stop_rx: watch::Receiver<bool>,
    ) {
        let mut state = PollState::new();

        loop {
            if *stop_rx.borrow() {
                break;
            }

            if !state.try_begin() {
                continue;
            }

            let fingerprint = task.fingerprint();
            let result = task.poll().await;
            let now = Utc::now();

            if *stop_rx.borrow() {
                break;
            }

            let delay = match result {
                Ok(batch) => {
                    state.complete_success(now);

                    if task.fingerprint() != fingerprint {
                        tracing::debug!("Discarding poll results: parameters changed mid-flight");
                    } else if tx.send(PollUpdate::Completed { batch, at: now }).await.is_err() {
                        tracing::debug!("Update receiver dropped, stopping poll loop");
                        break;
                    }

                    config.interval
                }
                Err(e) => {
                    state.complete_failure();
                    let backoff = state.schedule_backoff(config.initial_backoff, config.max_backoff);
                    tracing::warn!(
                        error = %e,
                        attempt = state.consecutive_failures(),
                        retry_in_ms = backoff.as_millis() as u64,
                        "Poll cycle failed, backing off"
                    );

                    let update = PollUpdate::Failed {
                        error: e.to_string(),
                        attempt: state.consecutive_failures(),
                        retry_in: Some(backoff),
                    };
                    if tx.send(update).await.is_err() {
                        break;
                    }

                    backoff
                }
            };

            tokio::select! {
                _ = sleep(delay) => {}
                _ = cancelled(&mut stop_rx) => break,
            }
        }
    }
}

/// Resolves once stop has been requested or the handle was dropped
async fn cancelled(stop_rx: &mut watch::Receiver<bool>) {
    while stop_rx.changed().await.is_ok() {
        if *stop_rx.borrow() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    /// Task whose outcome per call is scripted up front
    struct ScriptedTask {
        calls: Arc<AtomicU32>,
        fingerprint: Arc<AtomicU64>,
        failures_before_success: u32,
        delay: Duration,
    }

    impl ScriptedTask {
        fn new(failures_before_success: u32) -> Self {
            Self {
                calls: Arc::new(AtomicU32::new(0)),
                fingerprint: Arc::new(AtomicU64::new(1)),
                failures_before_success,
                delay: Duration::ZERO,
            }
        }

        fn call_counter(&self) -> Arc<AtomicU32> {
            self.calls.clone()
        }

        fn fingerprint_handle(&self) -> Arc<AtomicU64> {
            self.fingerprint.clone()
        }
    }

    #[async_trait]
    impl PollTask for ScriptedTask {
        type Output = u32;

        fn fingerprint(&self) -> u64 {
            self.fingerprint.load(Ordering::SeqCst)
        }

        async fn poll(&self) -> anyhow::Result<u32> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if !self.delay.is_zero() {
                sleep(self.delay).await;
            }
            if call <= self.failures_before_success {
                anyhow::bail!("scripted failure {}", call)
            }
            Ok(call)
        }
    }

    fn fast_config(policy: PollPolicy) -> PollConfig {
        PollConfig::new(policy)
            .interval(Duration::from_millis(20))
            .initial_backoff(Duration::from_millis(10))
            .max_backoff(Duration::from_millis(40))
    }

    #[tokio::test]
    async fn test_backoff_retry_delays_follow_doubling() {
        let task = ScriptedTask::new(u32::MAX);
        let (handle, mut rx) = PollScheduler::start(task, fast_config(PollPolicy::Backoff));

        let mut delays = vec![];
        for _ in 0..4 {
            match rx.recv().await.unwrap() {
                PollUpdate::Failed { retry_in, attempt, .. } => {
                    delays.push((attempt, retry_in.unwrap()));
                }
                other => panic!("Expected failure update, got {:?}", other),
            }
        }
        handle.stop();

        assert_eq!(
            delays,
            vec![
                (1, Duration::from_millis(10)),
                (2, Duration::from_millis(20)),
                (3, Duration::from_millis(40)),
                (4, Duration::from_millis(40)),
            ]
        );
    }

    #[tokio::test]
    async fn test_backoff_attempt_counter_resets_after_success() {
        let task = ScriptedTask::new(1);
        let (handle, mut rx) = PollScheduler::start(task, fast_config(PollPolicy::Backoff));

        match rx.recv().await.unwrap() {
            PollUpdate::Failed { attempt, retry_in, .. } => {
                assert_eq!(attempt, 1);
                assert_eq!(retry_in, Some(Duration::from_millis(10)));
            }
            other => panic!("Expected failure update, got {:?}", other),
        }

        match rx.recv().await.unwrap() {
            PollUpdate::Completed { batch, .. } => assert_eq!(batch, 2),
            other => panic!("Expected completed update, got {:?}", other),
        }

        handle.stop();
    }

    #[tokio::test]
    async fn test_fixed_interval_emits_failures_without_backoff() {
        let task = ScriptedTask::new(1);
        let (handle, mut rx) = PollScheduler::start(task, fast_config(PollPolicy::FixedInterval));

        match rx.recv().await.unwrap() {
            PollUpdate::Failed { retry_in, .. } => assert_eq!(retry_in, None),
            other => panic!("Expected failure update, got {:?}", other),
        }

        match rx.recv().await.unwrap() {
            PollUpdate::Completed { batch, .. } => assert_eq!(batch, 2),
            other => panic!("Expected completed update, got {:?}", other),
        }

        handle.stop();
    }

    #[tokio::test]
    async fn test_stop_prevents_further_fetches() {
        let task = ScriptedTask::new(0);
        let calls = task.call_counter();
        let (handle, mut rx) = PollScheduler::start(task, fast_config(PollPolicy::FixedInterval));

        // First cycle fires immediately.
        assert!(rx.recv().await.is_some());
        handle.stop();
        // Stopping twice (or before any fetch) must not panic.
        handle.stop();
        assert!(handle.is_stopped());

        // Loop breaks and drops the sender.
        assert!(rx.recv().await.is_none());

        let observed = calls.load(Ordering::SeqCst);
        sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), observed);
    }

    #[tokio::test]
    async fn test_stale_fingerprint_results_are_discarded() {
        let mut task = ScriptedTask::new(0);
        task.delay = Duration::from_millis(40);
        let fingerprint = task.fingerprint_handle();
        let (handle, mut rx) = PollScheduler::start(task, fast_config(PollPolicy::FixedInterval));

        // Mutate the parameters while the first fetch is in flight.
        sleep(Duration::from_millis(10)).await;
        fingerprint.store(2, Ordering::SeqCst);

        // The first fetch resolves against a changed fingerprint and is
        // dropped; the first emitted batch comes from a later fetch.
        match rx.recv().await.unwrap() {
            PollUpdate::Completed { batch, .. } => assert!(batch >= 2),
            other => panic!("Expected completed update, got {:?}", other),
        }

        handle.stop();
    }

    #[tokio::test]
    async fn test_fixed_interval_never_overlaps_fetches() {
        let mut task = ScriptedTask::new(0);
        // Each fetch takes several intervals; overlapping ticks must be
        // skipped rather than stacked.
        task.delay = Duration::from_millis(60);
        let calls = task.call_counter();
        let (handle, mut rx) = PollScheduler::start(task, fast_config(PollPolicy::FixedInterval));

        sleep(Duration::from_millis(200)).await;
        handle.stop();
        while rx.recv().await.is_some() {}

        let total = calls.load(Ordering::SeqCst);
        assert!(total >= 1, "Expected at least one fetch, got {}", total);
        assert!(total <= 4, "Expected skipped ticks, got {} fetches", total);
    }
}
