use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info};

use crate::clients::provider::ChannelProvider;
use crate::error::NotifyError;
use crate::models::channel::{Channel, ChannelAddress, Delivery, ProviderReceipt};

#[derive(Deserialize)]
struct WebhookResponse {
    #[serde(default)]
    message_id: Option<String>,
}

/// Generic JSON-webhook provider for single-address channels (email, SMS
/// gateways and similar). Posts the rendered message to a configured
/// endpoint and treats any non-2xx response as a provider failure.
pub struct HttpProvider {
    id: String,
    channel: Channel,
    priority: u8,
    active: bool,
    endpoint: String,
    http_client: Client,
}

impl HttpProvider {
    pub fn new(
        id: impl Into<String>,
        channel: Channel,
        endpoint: impl Into<String>,
        priority: u8,
    ) -> Result<Self, NotifyError> {
        let id = id.into();
        let endpoint = endpoint.into();

        let http_client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| NotifyError::Provider {
                provider_id: id.clone(),
                message: format!("failed to create HTTP client: {}", e),
            })?;

        info!(provider = %id, %channel, endpoint = %endpoint, "HTTP provider initialized");

        Ok(Self {
            id,
            channel,
            priority,
            active: true,
            endpoint,
            http_client,
        })
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    fn payload(&self, delivery: &Delivery) -> serde_json::Value {
        match &delivery.address {
            ChannelAddress::Email(address) => serde_json::json!({
                "to": address,
                "subject": delivery.title,
                "body": delivery.body,
                "data": delivery.data,
                "trace_id": delivery.trace_id,
            }),
            ChannelAddress::Phone(number) => serde_json::json!({
                "to": number,
                "body": delivery.body,
                "trace_id": delivery.trace_id,
            }),
            ChannelAddress::PushTokens(tokens) => serde_json::json!({
                "tokens": tokens,
                "title": delivery.title,
                "body": delivery.body,
                "data": delivery.data,
                "trace_id": delivery.trace_id,
            }),
        }
    }
}

#[async_trait]
impl ChannelProvider for HttpProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn channel(&self) -> Channel {
        self.channel
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn is_active(&self) -> bool {
        self.active
    }

    async fn send(&self, delivery: &Delivery) -> Result<ProviderReceipt, NotifyError> {
        debug!(
            provider = %self.id,
            channel = %self.channel,
            trace_id = %delivery.trace_id,
            "Posting message to webhook provider"
        );

        let address_count = match &delivery.address {
            ChannelAddress::PushTokens(tokens) => tokens.len() as u32,
            _ => 1,
        };

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&self.payload(delivery))
            .send()
            .await
            .map_err(|e| NotifyError::Provider {
                provider_id: self.id.clone(),
                message: e.to_string(),
            })?;

        let status = response.status();

        if status.is_success() {
            let message_id = response
                .json::<WebhookResponse>()
                .await
                .ok()
                .and_then(|r| r.message_id);

            Ok(ProviderReceipt {
                message_id,
                delivered: address_count,
                failed: 0,
            })
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(NotifyError::Provider {
                provider_id: self.id.clone(),
                message: format!("webhook returned status {}: {}", status, error_text),
            })
        }
    }
}
