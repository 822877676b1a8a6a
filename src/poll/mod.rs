//! Polling engine
//!
//! Drives feed fetches on a cadence with cancellation, stale-result
//! discard, and per-policy failure handling

mod feed_task;
mod scheduler;
mod types;

pub use feed_task::FeedPollTask;
pub use scheduler::{PollHandle, PollScheduler};
pub use types::{PollConfig, PollPolicy, PollState, PollUpdate};

use async_trait::async_trait;

/// Unit of work driven by the scheduler
///
/// Implementations must be cheap to fingerprint: the digest is read when a
/// fetch is issued and again when it resolves to detect parameter changes.
#[async_trait]
pub trait PollTask: Send + Sync + 'static {
    /// Result of one successful fetch
    type Output: Send + 'static;

    /// Digest of the parameters a fetch issued right now would use
    fn fingerprint(&self) -> u64;

    /// Execute one fetch
    async fn poll(&self) -> anyhow::Result<Self::Output>;
}
