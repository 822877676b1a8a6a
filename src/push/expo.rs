//! Expo push gateway client

use super::{DispatchError, OutboundMessage, PushGateway};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

/// Expo push API endpoint
pub const EXPO_PUSH_ENDPOINT: &str = "https://exp.host/--/api/v2/push/send";

/// Configuration for the Expo push client
#[derive(Debug, Clone)]
pub struct ExpoConfig {
    /// Push API endpoint URL
    pub endpoint: String,
    /// Request timeout
    pub timeout: Duration,
}

impl Default for ExpoConfig {
    fn default() -> Self {
        Self {
            endpoint: EXPO_PUSH_ENDPOINT.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Client for the Expo push API
///
/// Assumes push tokens were validated at registration time.
pub struct ExpoPushClient {
    config: ExpoConfig,
    client: Client,
}

impl ExpoPushClient {
    /// Create a new client with default configuration
    pub fn new() -> Self {
        Self::with_config(ExpoConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ExpoConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }
}

impl Default for ExpoPushClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PushGateway for ExpoPushClient {
    async fn send_batch(&self, messages: &[OutboundMessage]) -> Result<(), DispatchError> {
        let response = self
            .client
            .post(&self.config.endpoint)
            .header("Accept", "application/json")
            .json(messages)
            .send()
            .await
            .map_err(|e| DispatchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Gateway {
                status: status.as_u16(),
            });
        }

        // Individual per-message receipts are not modeled; the body is only
        // useful when troubleshooting delivery.
        match response.json::<serde_json::Value>().await {
            Ok(body) => tracing::debug!(response = %body, "Push gateway accepted batch"),
            Err(e) => tracing::debug!(error = %e, "Push gateway response was not JSON"),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expo_config_default() {
        let config = ExpoConfig::default();
        assert_eq!(config.endpoint, EXPO_PUSH_ENDPOINT);
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_expo_client_creation() {
        let client = ExpoPushClient::new();
        assert_eq!(client.config.endpoint, EXPO_PUSH_ENDPOINT);
    }

    #[test]
    fn test_expo_config_custom() {
        let config = ExpoConfig {
            endpoint: "https://push.example.com/send".to_string(),
            timeout: Duration::from_secs(30),
        };
        let client = ExpoPushClient::with_config(config);
        assert_eq!(client.config.endpoint, "https://push.example.com/send");
        assert_eq!(client.config.timeout, Duration::from_secs(30));
    }
}
