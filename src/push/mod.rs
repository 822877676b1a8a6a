//! Push notification module
//!
//! Builds outbound messages and delivers them through a push gateway

mod dispatcher;
mod expo;
mod types;

pub use dispatcher::NotificationDispatcher;
pub use expo::{ExpoConfig, ExpoPushClient, EXPO_PUSH_ENDPOINT};
pub use types::{DispatchError, MessagePayload, OutboundMessage};

use async_trait::async_trait;

/// Trait for push gateway implementations
///
/// The gateway accepts a whole batch in one request and reports overall
/// acceptance; per-message delivery outcomes are not modeled.
#[async_trait]
pub trait PushGateway: Send + Sync {
    /// Deliver a batch of messages
    async fn send_batch(&self, messages: &[OutboundMessage]) -> Result<(), DispatchError>;
}
