use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::models::{channel::Channel, notification::NotificationStatus};

/// One record of a send attempt, written after the outcome is known.
/// Audit writes are fire-and-forget and never fail the calling operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: Uuid,
    pub action: String,
    pub subject_id: String,
    pub actor_id: Option<String>,
    pub status: Option<NotificationStatus>,
    pub channels: Vec<Channel>,
    pub error_message: Option<String>,
    pub metadata: JsonValue,
    pub created_at: DateTime<Utc>,
}

impl AuditRecord {
    pub fn new(action: impl Into<String>, subject_id: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.into(),
            subject_id: subject_id.into(),
            actor_id: None,
            status: None,
            channels: Vec::new(),
            error_message: None,
            metadata: serde_json::json!({}),
            created_at: Utc::now(),
        }
    }

    pub fn with_actor(mut self, actor_id: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.into());
        self
    }

    pub fn with_status(mut self, status: NotificationStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_channels(mut self, channels: Vec<Channel>) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_error(mut self, error: String) -> Self {
        self.error_message = Some(error);
        self
    }

    pub fn with_metadata(mut self, metadata: JsonValue) -> Self {
        self.metadata = metadata;
        self
    }
}
