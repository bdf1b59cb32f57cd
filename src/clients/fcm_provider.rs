use std::collections::HashMap;

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::clients::provider::ChannelProvider;
use crate::error::NotifyError;
use crate::models::channel::{Channel, ChannelAddress, Delivery, ProviderReceipt};

#[derive(Debug, Clone, Serialize)]
struct FcmNotification {
    title: String,
    body: String,
}

#[derive(Debug, Clone, Serialize)]
struct FcmMessage {
    token: String,
    notification: FcmNotification,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize)]
struct FcmRequest {
    message: FcmMessage,
}

/// Push provider backed by FCM's HTTP v1 API. One request per device token;
/// per-token failures are counted, not fatal, as long as something delivers.
pub struct FcmProvider {
    id: String,
    priority: u8,
    active: bool,
    http_client: Client,
    project_id: String,
}

impl FcmProvider {
    pub fn new(id: impl Into<String>, project_id: impl Into<String>, priority: u8) -> Self {
        let project_id = project_id.into();
        info!(project_id = %project_id, "FCM provider initialized");

        Self {
            id: id.into(),
            priority,
            active: true,
            http_client: Client::new(),
            project_id,
        }
    }

    pub fn with_active(mut self, active: bool) -> Self {
        self.active = active;
        self
    }

    async fn send_to_token(
        &self,
        token: &str,
        delivery: &Delivery,
    ) -> Result<(), NotifyError> {
        let mut payload_data = HashMap::new();
        payload_data.insert("trace_id".to_string(), delivery.trace_id.clone());

        let request = FcmRequest {
            message: FcmMessage {
                token: token.to_string(),
                notification: FcmNotification {
                    title: delivery.title.clone(),
                    body: delivery.body.clone(),
                },
                data: Some(payload_data),
            },
        };

        let provider = gcp_auth::provider()
            .await
            .map_err(|e| self.provider_error(format!("GCP auth unavailable: {}", e)))?;
        let scopes = &["https://www.googleapis.com/auth/firebase.messaging"];

        let auth_token = provider
            .token(scopes)
            .await
            .map_err(|e| self.provider_error(format!("GCP token fetch failed: {}", e)))?;

        let url = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.project_id
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(auth_token.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| self.provider_error(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let error_text = response.text().await.unwrap_or_default();
            Err(self.provider_error(format!("FCM request failed: {}", error_text)))
        }
    }

    fn provider_error(&self, message: String) -> NotifyError {
        NotifyError::Provider {
            provider_id: self.id.clone(),
            message,
        }
    }
}

#[async_trait]
impl ChannelProvider for FcmProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn channel(&self) -> Channel {
        Channel::Push
    }

    fn priority(&self) -> u8 {
        self.priority
    }

    fn is_active(&self) -> bool {
        self.active
    }

    async fn send(&self, delivery: &Delivery) -> Result<ProviderReceipt, NotifyError> {
        let ChannelAddress::PushTokens(tokens) = &delivery.address else {
            return Err(self.provider_error("FCM provider only handles push tokens".to_string()));
        };

        debug!(
            provider = %self.id,
            token_count = tokens.len(),
            trace_id = %delivery.trace_id,
            "Sending FCM push notifications"
        );

        let mut delivered = 0u32;
        let mut failed = 0u32;
        let mut last_error: Option<NotifyError> = None;

        for token in tokens {
            match self.send_to_token(token, delivery).await {
                Ok(()) => delivered += 1,
                Err(e) => {
                    warn!(
                        provider = %self.id,
                        trace_id = %delivery.trace_id,
                        error = %e,
                        "FCM token delivery failed"
                    );
                    failed += 1;
                    last_error = Some(e);
                }
            }
        }

        if delivered == 0 {
            return Err(last_error
                .unwrap_or_else(|| self.provider_error("empty token set".to_string())));
        }

        Ok(ProviderReceipt {
            message_id: Some(delivery.trace_id.clone()),
            delivered,
            failed,
        })
    }
}
