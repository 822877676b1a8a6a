//! Subscriber registry module
//!
//! Holds registered devices and their notification preferences. The core
//! only consumes the read/update interface; storage durability is the
//! implementation's concern.

mod memory;
mod types;

pub use memory::InMemoryRegistry;
pub use types::{RegistrationError, RegistrationRequest, Subscriber};

use async_trait::async_trait;

/// Trait for subscriber registry implementations
#[async_trait]
pub trait SubscriberRegistry: Send + Sync {
    /// All subscribers eligible for alert evaluation
    async fn list_active(&self) -> anyhow::Result<Vec<Subscriber>>;
    /// Commit a subscriber mutation (typically a watermark advance)
    async fn persist(&self, subscriber: &Subscriber) -> anyhow::Result<()>;
}
