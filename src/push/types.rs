//! Push notification types

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Structured payload attached to a notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePayload {
    /// Feed identifier of the event that triggered the alert
    pub usgs_id: String,
    /// Subscriber's region label
    pub country: Option<String>,
}

/// One notification addressed to a single device
///
/// Constructed by the alert evaluator, sent in batches by the dispatcher,
/// never persisted. Serializes to the Expo push message shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Target push token
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,
    pub title: String,
    pub body: String,
    pub data: MessagePayload,
}

/// Push dispatch errors
#[derive(Debug, Error)]
pub enum DispatchError {
    /// Gateway rejected the batch
    #[error("Push gateway returned status {status}")]
    Gateway { status: u16 },
    /// Gateway could not be reached
    #[error("Push gateway unreachable: {0}")]
    Transport(String),
}
