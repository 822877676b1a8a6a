//! Feed-backed poll task for the live event list

use super::PollTask;
use crate::feed::{EventFeed, FeedQuery, SeismicEvent};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::watch;

/// Polls an [`EventFeed`] with a retargetable query
///
/// The query lives in a watch channel so the consumer can change region or
/// magnitude filters while the loop runs; the scheduler's fingerprint check
/// then discards any fetch that was issued against the old parameters.
pub struct FeedPollTask {
    feed: Arc<dyn EventFeed>,
    query: watch::Receiver<FeedQuery>,
}

impl FeedPollTask {
    /// Create a task reading its parameters from the given channel
    pub fn new(feed: Arc<dyn EventFeed>, query: watch::Receiver<FeedQuery>) -> Self {
        Self { feed, query }
    }

    /// Create a task with fixed parameters, returning the sender used to
    /// retarget them later
    pub fn with_query(
        feed: Arc<dyn EventFeed>,
        initial: FeedQuery,
    ) -> (Self, watch::Sender<FeedQuery>) {
        let (tx, rx) = watch::channel(initial);
        (Self::new(feed, rx), tx)
    }
}

#[async_trait]
impl PollTask for FeedPollTask {
    type Output = Vec<SeismicEvent>;

    fn fingerprint(&self) -> u64 {
        self.query.borrow().fingerprint()
    }

    async fn poll(&self) -> anyhow::Result<Vec<SeismicEvent>> {
        let query = self.query.borrow().clone();
        let events = self.feed.fetch_events(&query).await?;
        Ok(events)
    }
}
