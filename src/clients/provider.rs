use std::sync::Arc;

use async_trait::async_trait;

use crate::error::NotifyError;
use crate::models::channel::{Channel, Delivery, ProviderReceipt};

/// One concrete delivery implementation for one channel. The registry holds
/// values of this trait; adding a provider is a compile-time-checked change.
#[async_trait]
pub trait ChannelProvider: Send + Sync {
    fn id(&self) -> &str;

    fn channel(&self) -> Channel;

    /// Ascending priority: lower values are tried first during failover.
    fn priority(&self) -> u8;

    fn is_active(&self) -> bool {
        true
    }

    async fn send(&self, delivery: &Delivery) -> Result<ProviderReceipt, NotifyError>;
}

/// Per-channel ordered provider set. Built once at startup and read-mostly
/// afterwards; administrative changes rebuild the registry.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: Vec<Arc<dyn ChannelProvider>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn ChannelProvider>) {
        self.providers.push(provider);
    }

    /// Active providers for a channel, ascending by priority. This ordering
    /// is the failover contract: candidates are tried strictly in this order.
    pub fn ordered_providers(&self, channel: Channel) -> Vec<Arc<dyn ChannelProvider>> {
        let mut candidates: Vec<Arc<dyn ChannelProvider>> = self
            .providers
            .iter()
            .filter(|p| p.channel() == channel && p.is_active())
            .cloned()
            .collect();

        candidates.sort_by_key(|p| p.priority());
        candidates
    }

    /// One specific provider by id, used when a send explicitly requests a
    /// provider and bypasses failover.
    pub fn provider(&self, channel: Channel, id: &str) -> Option<Arc<dyn ChannelProvider>> {
        self.providers
            .iter()
            .find(|p| p.channel() == channel && p.id() == id)
            .cloned()
    }

    pub fn active_count(&self, channel: Channel) -> usize {
        self.providers
            .iter()
            .filter(|p| p.channel() == channel && p.is_active())
            .count()
    }
}
