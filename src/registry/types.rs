//! Subscriber registry types

use crate::feed::RegionFilter;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A registered device and its notification preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Opaque push-address token; doubles as the subscriber identity
    pub push_token: String,
    /// Optional country/region label echoed back in notifications
    pub country: Option<String>,
    /// Optional geographic restriction for this subscriber's queries
    pub region: Option<RegionFilter>,
    /// Minimum magnitude to retrieve from the feed
    pub min_magnitude: f64,
    /// Stricter threshold that gates notification
    pub significant_magnitude_threshold: f64,
    /// Time of the most recent event already notified (the watermark)
    pub last_notified_at: Option<DateTime<Utc>>,
}

impl Subscriber {
    /// Advance the watermark, keeping it monotonically non-decreasing
    pub fn advance_watermark(&mut self, at: DateTime<Utc>) {
        if self.last_notified_at.map_or(true, |current| at > current) {
            self.last_notified_at = Some(at);
        }
    }
}

/// Inbound registration payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationRequest {
    pub push_token: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<RegionFilter>,
    pub min_magnitude: f64,
    pub significant_magnitude_threshold: f64,
}

impl RegistrationRequest {
    /// Validate the payload and build the subscriber it describes
    ///
    /// Invalid input produces a descriptive error and no subscriber; the
    /// registry stores nothing for a rejected request.
    pub fn validate(self) -> Result<Subscriber, RegistrationError> {
        if self.push_token.is_empty() {
            return Err(RegistrationError::EmptyToken);
        }

        if !self.min_magnitude.is_finite() {
            return Err(RegistrationError::InvalidMagnitude {
                field: "minMagnitude",
            });
        }

        if !self.significant_magnitude_threshold.is_finite() {
            return Err(RegistrationError::InvalidMagnitude {
                field: "significantMagnitudeThreshold",
            });
        }

        if let Some(region) = &self.region {
            if !region.is_valid() {
                return Err(RegistrationError::InvalidRegion);
            }
        }

        Ok(Subscriber {
            push_token: self.push_token,
            country: self.country,
            region: self.region,
            min_magnitude: self.min_magnitude,
            significant_magnitude_threshold: self.significant_magnitude_threshold,
            last_notified_at: None,
        })
    }
}

/// Registration intake errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// Push token missing or empty
    #[error("Push token is required")]
    EmptyToken,
    /// A magnitude field is not a finite number
    #[error("{field} must be a finite number")]
    InvalidMagnitude { field: &'static str },
    /// Bounding box has non-finite or inverted bounds
    #[error("Bounding box is invalid")]
    InvalidRegion,
}
