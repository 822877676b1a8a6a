//! USGS earthquake catalog client
//!
//! Fetches recent earthquakes from the USGS FDSN event service and maps the
//! GeoJSON response into the internal [`SeismicEvent`] model. Events come
//! back newest-first (`orderby=time`), which the rest of the pipeline
//! relies on.

use super::{EventFeed, FeedError, FeedQuery, SeismicEvent, UNKNOWN_PLACE_LABEL};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// USGS FDSN event service base URL
pub const USGS_API_URL: &str = "https://earthquake.usgs.gov/fdsnws/event/1";

/// Configuration for the USGS client
#[derive(Debug, Clone)]
pub struct UsgsConfig {
    /// Base URL for the event service
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for UsgsConfig {
    fn default() -> Self {
        Self {
            base_url: USGS_API_URL.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the USGS earthquake catalog
pub struct UsgsClient {
    config: UsgsConfig,
    client: Client,
}

impl UsgsClient {
    /// Create a new USGS client with default configuration
    pub fn new() -> Self {
        Self::with_config(UsgsConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: UsgsConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Build the query string parameters for a feed query
    fn build_params(query: &FeedQuery) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("format", "geojson".to_string()),
            ("orderby", "time".to_string()),
            ("starttime", format_instant(query.start)),
            ("minmagnitude", query.min_magnitude.to_string()),
            ("limit", query.limit.to_string()),
        ];

        if let Some(end) = query.end {
            params.push(("endtime", format_instant(end)));
        }

        if let Some(region) = &query.region {
            params.push(("minlatitude", region.min_latitude.to_string()));
            params.push(("maxlatitude", region.max_latitude.to_string()));
            params.push(("minlongitude", region.min_longitude.to_string()));
            params.push(("maxlongitude", region.max_longitude.to_string()));
        }

        params
    }
}

impl Default for UsgsClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventFeed for UsgsClient {
    async fn fetch_events(&self, query: &FeedQuery) -> Result<Vec<SeismicEvent>, FeedError> {
        let url = format!("{}/query", self.config.base_url);
        let params = Self::build_params(query);

        tracing::debug!(url = %url, min_magnitude = query.min_magnitude, "Querying USGS event service");

        let response = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, "Network error fetching earthquakes");
                FeedError::Unavailable { status: None }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(status = status.as_u16(), "USGS API returned non-success response");
            return Err(FeedError::Unavailable {
                status: Some(status.as_u16()),
            });
        }

        let body: UsgsResponse = response
            .json()
            .await
            .map_err(|e| FeedError::Parse(e.to_string()))?;

        let events = body
            .features
            .into_iter()
            .map(map_feature)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(event_count = events.len(), "Fetched earthquakes");

        Ok(events)
    }
}

/// Raw GeoJSON response from the USGS event service
///
/// A missing `features` array is treated the same as an empty one.
#[derive(Debug, Deserialize)]
struct UsgsResponse {
    #[serde(default)]
    features: Vec<UsgsFeature>,
}

/// One feature (earthquake) in the GeoJSON response
#[derive(Debug, Deserialize)]
struct UsgsFeature {
    id: String,
    properties: UsgsProperties,
    geometry: UsgsGeometry,
}

#[derive(Debug, Deserialize)]
struct UsgsProperties {
    mag: Option<f64>,
    place: Option<String>,
    /// Occurrence time in epoch milliseconds
    time: i64,
}

#[derive(Debug, Deserialize)]
struct UsgsGeometry {
    /// `[longitude, latitude, depth_km]` per GeoJSON point convention
    coordinates: [f64; 3],
}

/// Map a raw feature into the internal event model
fn map_feature(feature: UsgsFeature) -> Result<SeismicEvent, FeedError> {
    let [longitude, latitude, depth_km] = feature.geometry.coordinates;

    let occurred_at = Utc
        .timestamp_millis_opt(feature.properties.time)
        .single()
        .ok_or_else(|| {
            FeedError::Parse(format!(
                "Event {} has invalid timestamp {}",
                feature.id, feature.properties.time
            ))
        })?;

    Ok(SeismicEvent {
        id: feature.id,
        magnitude: feature.properties.mag,
        place: feature
            .properties
            .place
            .unwrap_or_else(|| UNKNOWN_PLACE_LABEL.to_string()),
        occurred_at,
        latitude,
        longitude,
        depth_km,
    })
}

fn format_instant(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, true)
}
