use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::models::{
    channel::Channel,
    notification::{Notification, NotificationIntent, NotificationType, Priority},
};

/// Fan the same message out to many recipients in bounded batches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkRequest {
    pub recipient_ids: Vec<String>,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,

    #[serde(default)]
    pub channels: Vec<Channel>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub data: JsonValue,

    #[serde(default)]
    pub issuer_id: Option<String>,

    /// Overrides the configured batch size when present.
    #[serde(default)]
    pub batch_size: Option<usize>,
}

impl BulkRequest {
    pub fn new(
        recipient_ids: Vec<String>,
        notification_type: NotificationType,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient_ids,
            notification_type,
            title: title.into(),
            body: body.into(),
            channels: Vec::new(),
            priority: Priority::Normal,
            data: JsonValue::Null,
            issuer_id: None,
            batch_size: None,
        }
    }

    pub fn with_channels(mut self, channels: Vec<Channel>) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = Some(batch_size);
        self
    }

    pub fn intent_for(&self, recipient_id: &str) -> NotificationIntent {
        NotificationIntent {
            recipient_id: recipient_id.to_string(),
            notification_type: self.notification_type,
            title: self.title.clone(),
            body: self.body.clone(),
            channels: self.channels.clone(),
            priority: self.priority,
            data: self.data.clone(),
            issuer_id: self.issuer_id.clone(),
            provider_id: None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BulkError {
    pub recipient_id: String,
    pub error: String,
}

/// Exact per-recipient accounting: `sent + failed == total` always holds.
#[derive(Debug, Serialize)]
pub struct BulkResult {
    pub total: usize,
    pub sent: usize,
    pub failed: usize,
    pub notifications: Vec<Notification>,
    pub errors: Vec<BulkError>,
}
