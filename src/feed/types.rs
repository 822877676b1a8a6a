//! Seismic feed types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Label used when the feed does not provide a place string
pub const UNKNOWN_PLACE_LABEL: &str = "Unknown location";

/// A single earthquake observed on the feed
///
/// Immutable once constructed from feed data. The place label is normalized
/// at the feed boundary: a missing label becomes [`UNKNOWN_PLACE_LABEL`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeismicEvent {
    /// Source-assigned identifier, unique per feed
    pub id: String,
    /// Magnitude as reported (the feed may omit it for fresh events)
    pub magnitude: Option<f64>,
    /// Human-readable place label
    pub place: String,
    /// Occurrence time
    pub occurred_at: DateTime<Utc>,
    /// Epicenter latitude
    pub latitude: f64,
    /// Epicenter longitude
    pub longitude: f64,
    /// Hypocenter depth in kilometers
    pub depth_km: f64,
}

impl SeismicEvent {
    /// Magnitude coerced for threshold comparison (absent reads as 0.0)
    pub fn magnitude_or_zero(&self) -> f64 {
        self.magnitude.unwrap_or(0.0)
    }
}

/// Rectangular bounding box used to restrict feed queries to a region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionFilter {
    pub min_latitude: f64,
    pub max_latitude: f64,
    pub min_longitude: f64,
    pub max_longitude: f64,
}

impl RegionFilter {
    /// Check the box invariant: finite bounds, min <= max on both axes
    pub fn is_valid(&self) -> bool {
        let bounds = [
            self.min_latitude,
            self.max_latitude,
            self.min_longitude,
            self.max_longitude,
        ];
        bounds.iter().all(|b| b.is_finite())
            && self.min_latitude <= self.max_latitude
            && self.min_longitude <= self.max_longitude
    }
}

/// Parameters for one feed query window
#[derive(Debug, Clone, PartialEq)]
pub struct FeedQuery {
    /// Start of the lookback window
    pub start: DateTime<Utc>,
    /// Optional end of the window (defaults to "now" on the feed side)
    pub end: Option<DateTime<Utc>>,
    /// Minimum magnitude to retrieve
    pub min_magnitude: f64,
    /// Maximum number of events to return
    pub limit: u32,
    /// Optional geographic restriction
    pub region: Option<RegionFilter>,
}

impl FeedQuery {
    /// Stable digest of the query parameters
    ///
    /// Captured when a fetch is issued and compared when it resolves, so a
    /// fetch whose parameters were mutated mid-flight can be discarded.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.start.timestamp_millis().hash(&mut hasher);
        self.end.map(|e| e.timestamp_millis()).hash(&mut hasher);
        self.min_magnitude.to_bits().hash(&mut hasher);
        self.limit.hash(&mut hasher);
        match &self.region {
            Some(region) => {
                1u8.hash(&mut hasher);
                region.min_latitude.to_bits().hash(&mut hasher);
                region.max_latitude.to_bits().hash(&mut hasher);
                region.min_longitude.to_bits().hash(&mut hasher);
                region.max_longitude.to_bits().hash(&mut hasher);
            }
            None => 0u8.hash(&mut hasher),
        }
        hasher.finish()
    }
}

/// Feed access errors
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport failure or non-success status from the feed
    #[error("Seismic feed unavailable (status: {status:?})")]
    Unavailable {
        /// Upstream HTTP status, if a response was received at all
        status: Option<u16>,
    },
    /// Response body could not be decoded
    #[error("Malformed feed payload: {0}")]
    Parse(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_query() -> FeedQuery {
        FeedQuery {
            start: Utc.timestamp_millis_opt(1_700_000_000_000).unwrap(),
            end: None,
            min_magnitude: 2.5,
            limit: 50,
            region: Some(RegionFilter {
                min_latitude: 20.5,
                max_latitude: 26.7,
                min_longitude: 88.0,
                max_longitude: 92.7,
            }),
        }
    }

    #[test]
    fn test_magnitude_or_zero() {
        let event = SeismicEvent {
            id: "us1".to_string(),
            magnitude: None,
            place: UNKNOWN_PLACE_LABEL.to_string(),
            occurred_at: Utc::now(),
            latitude: 0.0,
            longitude: 0.0,
            depth_km: 10.0,
        };
        assert_eq!(event.magnitude_or_zero(), 0.0);

        let event = SeismicEvent {
            magnitude: Some(5.2),
            ..event
        };
        assert_eq!(event.magnitude_or_zero(), 5.2);
    }

    #[test]
    fn test_region_filter_valid() {
        let region = RegionFilter {
            min_latitude: 20.5,
            max_latitude: 26.7,
            min_longitude: 88.0,
            max_longitude: 92.7,
        };
        assert!(region.is_valid());
    }

    #[test]
    fn test_region_filter_inverted_bounds() {
        let region = RegionFilter {
            min_latitude: 26.7,
            max_latitude: 20.5,
            min_longitude: 88.0,
            max_longitude: 92.7,
        };
        assert!(!region.is_valid());
    }

    #[test]
    fn test_region_filter_non_finite() {
        let region = RegionFilter {
            min_latitude: f64::NAN,
            max_latitude: 26.7,
            min_longitude: 88.0,
            max_longitude: 92.7,
        };
        assert!(!region.is_valid());
    }

    #[test]
    fn test_region_filter_serde_camel_case() {
        let region = RegionFilter {
            min_latitude: 20.5,
            max_latitude: 26.7,
            min_longitude: 88.0,
            max_longitude: 92.7,
        };
        let json = serde_json::to_string(&region).unwrap();
        assert!(json.contains("minLatitude"));
        assert!(json.contains("maxLongitude"));
    }

    #[test]
    fn test_fingerprint_stable() {
        let query = sample_query();
        assert_eq!(query.fingerprint(), query.fingerprint());
        assert_eq!(query.fingerprint(), query.clone().fingerprint());
    }

    #[test]
    fn test_fingerprint_changes_with_parameters() {
        let query = sample_query();

        let mut changed = query.clone();
        changed.min_magnitude = 4.5;
        assert_ne!(query.fingerprint(), changed.fingerprint());

        let mut changed = query.clone();
        changed.region = None;
        assert_ne!(query.fingerprint(), changed.fingerprint());

        let mut changed = query.clone();
        changed.limit = 500;
        assert_ne!(query.fingerprint(), changed.fingerprint());
    }

    #[test]
    fn test_feed_error_display() {
        let err = FeedError::Unavailable { status: Some(503) };
        assert!(err.to_string().contains("503"));

        let err = FeedError::Parse("missing features".to_string());
        assert!(err.to_string().contains("missing features"));
    }
}
