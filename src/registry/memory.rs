//! In-memory subscriber registry
//!
//! Process-lifetime storage for registrations. Production deployments
//! should back [`SubscriberRegistry`] with a database instead.

use super::{RegistrationError, RegistrationRequest, Subscriber, SubscriberRegistry};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Registry backed by a shared in-memory list
#[derive(Clone, Default)]
pub struct InMemoryRegistry {
    subscribers: Arc<RwLock<Vec<Subscriber>>>,
}

impl InMemoryRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and store a registration
    ///
    /// Re-registering an existing token replaces the stored preferences but
    /// keeps the watermark, so a device updating its filters is not
    /// re-notified for an event it already saw.
    pub async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<Subscriber, RegistrationError> {
        let mut subscriber = request.validate()?;

        let mut subscribers = self.subscribers.write().await;
        match subscribers
            .iter_mut()
            .find(|s| s.push_token == subscriber.push_token)
        {
            Some(existing) => {
                subscriber.last_notified_at = existing.last_notified_at;
                *existing = subscriber.clone();
            }
            None => subscribers.push(subscriber.clone()),
        }

        tracing::info!(
            token = %subscriber.push_token,
            country = ?subscriber.country,
            "Device registered for earthquake alerts"
        );

        Ok(subscriber)
    }

    /// Number of stored registrations
    pub async fn len(&self) -> usize {
        self.subscribers.read().await.len()
    }

    /// Whether the registry holds no registrations
    pub async fn is_empty(&self) -> bool {
        self.subscribers.read().await.is_empty()
    }
}

#[async_trait]
impl SubscriberRegistry for InMemoryRegistry {
    async fn list_active(&self) -> anyhow::Result<Vec<Subscriber>> {
        let subscribers = self.subscribers.read().await;
        Ok(subscribers.clone())
    }

    async fn persist(&self, subscriber: &Subscriber) -> anyhow::Result<()> {
        let mut subscribers = self.subscribers.write().await;
        match subscribers
            .iter_mut()
            .find(|s| s.push_token == subscriber.push_token)
        {
            Some(existing) => *existing = subscriber.clone(),
            None => subscribers.push(subscriber.clone()),
        }
        Ok(())
    }
}
