use std::sync::Arc;

use tokio::time::{Duration, timeout};
use tracing::{debug, info, warn};

use crate::clients::provider::{ChannelProvider, ProviderRegistry};
use crate::config::Config;
use crate::engine::tracker::DeliveryTracker;
use crate::error::NotifyError;
use crate::models::{
    channel::{Channel, ChannelAddress, ChannelOutcome, Delivery, ProviderReceipt},
    notification::Notification,
    recipient::RecipientProfile,
};

/// Attempts delivery on one channel through the provider registry.
///
/// Failover contract: active providers are tried strictly sequentially in
/// ascending priority order, stopping at the first success. Providers are
/// never raced in parallel; one successful delivery attempt per channel per
/// notification at most.
pub struct ChannelDispatcher {
    registry: Arc<ProviderRegistry>,
    tracker: DeliveryTracker,
    provider_timeout: Duration,
    push_batch_ceiling: usize,
}

impl ChannelDispatcher {
    pub fn new(registry: Arc<ProviderRegistry>, tracker: DeliveryTracker, config: &Config) -> Self {
        Self {
            registry,
            tracker,
            provider_timeout: config.provider_timeout(),
            push_batch_ceiling: config.push_batch_ceiling.max(1),
        }
    }

    /// Runs one channel to a final outcome. Channel-level failures are folded
    /// into the returned outcome, never raised, so sibling channels are
    /// unaffected.
    pub async fn dispatch(
        &self,
        notification: &Notification,
        channel: Channel,
        profile: &RecipientProfile,
        provider_override: Option<&str>,
    ) -> ChannelOutcome {
        if let Err(e) = self.tracker.mark_sending(&notification.id, channel).await {
            warn!(
                notification_id = %notification.id,
                %channel,
                error = %e,
                "Failed to mark channel as sending"
            );
        }

        // In-app delivery is the persisted notification itself.
        if channel == Channel::InApp {
            return ChannelOutcome::sent(
                channel,
                None,
                ProviderReceipt {
                    message_id: Some(notification.id.clone()),
                    delivered: 1,
                    failed: 0,
                },
            );
        }

        let Some(address) = profile.address(channel) else {
            let error = NotifyError::NoAddressOnFile(channel);
            debug!(
                notification_id = %notification.id,
                %channel,
                recipient_id = %profile.recipient_id,
                "Recipient has no address for channel"
            );
            return ChannelOutcome::failed(channel, None, &error);
        };

        let delivery = Delivery {
            address,
            title: notification.title.clone(),
            body: notification.body.clone(),
            data: notification.data.clone(),
            trace_id: notification.id.clone(),
        };

        match provider_override {
            Some(provider_id) => {
                self.dispatch_explicit(notification, channel, provider_id, &delivery)
                    .await
            }
            None => self.dispatch_failover(notification, channel, &delivery).await,
        }
    }

    /// Explicitly requested provider: exactly one attempt, no failover.
    async fn dispatch_explicit(
        &self,
        notification: &Notification,
        channel: Channel,
        provider_id: &str,
        delivery: &Delivery,
    ) -> ChannelOutcome {
        let Some(provider) = self.registry.provider(channel, provider_id) else {
            let error = NotifyError::Provider {
                provider_id: provider_id.to_string(),
                message: format!("provider not registered for channel {}", channel),
            };
            return ChannelOutcome::failed(channel, Some(provider_id.to_string()), &error);
        };

        match self.attempt(&provider, delivery).await {
            Ok(receipt) => {
                info!(
                    notification_id = %notification.id,
                    %channel,
                    provider = %provider_id,
                    "Explicit provider delivery succeeded"
                );
                ChannelOutcome::sent(channel, Some(provider_id.to_string()), receipt)
            }
            Err(error) => {
                ChannelOutcome::failed(channel, Some(provider_id.to_string()), &error)
            }
        }
    }

    async fn dispatch_failover(
        &self,
        notification: &Notification,
        channel: Channel,
        delivery: &Delivery,
    ) -> ChannelOutcome {
        let candidates = self.registry.ordered_providers(channel);

        if candidates.is_empty() {
            let error = NotifyError::NoProvidersAvailable(channel);
            warn!(
                notification_id = %notification.id,
                %channel,
                "No active providers registered for channel"
            );
            return ChannelOutcome::failed(channel, None, &error);
        }

        let mut last_provider_id = String::new();
        let mut last_error = NotifyError::NoProvidersAvailable(channel);

        for provider in &candidates {
            match self.attempt(provider, delivery).await {
                Ok(receipt) => {
                    info!(
                        notification_id = %notification.id,
                        %channel,
                        provider = provider.id(),
                        delivered = receipt.delivered,
                        "Channel delivery succeeded"
                    );
                    return ChannelOutcome::sent(channel, Some(provider.id().to_string()), receipt);
                }
                Err(error) => {
                    warn!(
                        notification_id = %notification.id,
                        %channel,
                        provider = provider.id(),
                        error = %error,
                        "Provider attempt failed, trying next in priority order"
                    );
                    last_provider_id = provider.id().to_string();
                    last_error = error;
                }
            }
        }

        ChannelOutcome::failed(channel, Some(last_provider_id), &last_error)
    }

    /// One provider attempt, with push token sets above the batch ceiling
    /// subdivided into sub-batches.
    async fn attempt(
        &self,
        provider: &Arc<dyn ChannelProvider>,
        delivery: &Delivery,
    ) -> Result<ProviderReceipt, NotifyError> {
        if let ChannelAddress::PushTokens(tokens) = &delivery.address {
            if tokens.len() > self.push_batch_ceiling {
                return self.attempt_push_batches(provider, delivery, tokens).await;
            }
        }

        self.call(provider, delivery).await
    }

    /// Every sub-batch is attempted even when an earlier one errors; counts
    /// are aggregated and the attempt succeeds if anything delivered.
    async fn attempt_push_batches(
        &self,
        provider: &Arc<dyn ChannelProvider>,
        delivery: &Delivery,
        tokens: &[String],
    ) -> Result<ProviderReceipt, NotifyError> {
        let mut aggregate = ProviderReceipt::default();
        let mut last_error: Option<NotifyError> = None;

        for chunk in tokens.chunks(self.push_batch_ceiling) {
            let sub_delivery = Delivery {
                address: ChannelAddress::PushTokens(chunk.to_vec()),
                ..delivery.clone()
            };

            match self.call(provider, &sub_delivery).await {
                Ok(receipt) => {
                    aggregate.delivered += receipt.delivered;
                    aggregate.failed += receipt.failed;
                    if aggregate.message_id.is_none() {
                        aggregate.message_id = receipt.message_id;
                    }
                }
                Err(error) => {
                    warn!(
                        provider = provider.id(),
                        trace_id = %delivery.trace_id,
                        chunk_size = chunk.len(),
                        error = %error,
                        "Push sub-batch failed, continuing with remaining sub-batches"
                    );
                    aggregate.failed += chunk.len() as u32;
                    last_error = Some(error);
                }
            }
        }

        if aggregate.delivered == 0 {
            return Err(last_error.unwrap_or_else(|| NotifyError::Provider {
                provider_id: provider.id().to_string(),
                message: "no push tokens delivered".to_string(),
            }));
        }

        Ok(aggregate)
    }

    /// A timed-out provider call is indistinguishable from a failed one and
    /// triggers failover.
    async fn call(
        &self,
        provider: &Arc<dyn ChannelProvider>,
        delivery: &Delivery,
    ) -> Result<ProviderReceipt, NotifyError> {
        match timeout(self.provider_timeout, provider.send(delivery)).await {
            Ok(result) => result,
            Err(_) => Err(NotifyError::Provider {
                provider_id: provider.id().to_string(),
                message: format!(
                    "provider call timed out after {}ms",
                    self.provider_timeout.as_millis()
                ),
            }),
        }
    }
}
