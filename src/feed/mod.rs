//! Seismic feed module
//!
//! Fetches and normalizes earthquake events from the USGS catalog

mod types;
mod usgs;

pub use types::{FeedError, FeedQuery, RegionFilter, SeismicEvent, UNKNOWN_PLACE_LABEL};
pub use usgs::{UsgsClient, UsgsConfig, USGS_API_URL};

use async_trait::async_trait;

/// Trait for seismic event feed implementations
///
/// Implementations return events ordered by occurrence time descending
/// (newest first). Zero results is a valid, non-error outcome.
#[async_trait]
pub trait EventFeed: Send + Sync {
    /// Fetch events matching the query window and filters
    async fn fetch_events(&self, query: &FeedQuery) -> Result<Vec<SeismicEvent>, FeedError>;
}
