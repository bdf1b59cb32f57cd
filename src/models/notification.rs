use std::collections::HashMap;
use std::fmt::{Display, Formatter, Result};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use crate::models::channel::{Channel, ChannelOutcome, FailureKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    EventCancelled,
    EventUpdated,
    AppointmentReminder,
    Announcement,
    LeaveStatus,
    General,
}

impl Display for NotificationType {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            NotificationType::EventCancelled => write!(f, "event_cancelled"),
            NotificationType::EventUpdated => write!(f, "event_updated"),
            NotificationType::AppointmentReminder => write!(f, "appointment_reminder"),
            NotificationType::Announcement => write!(f, "announcement"),
            NotificationType::LeaveStatus => write!(f, "leave_status"),
            NotificationType::General => write!(f, "general"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Urgent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationStatus {
    Pending,
    Sent,
    Delivered,
    Failed,
}

impl Display for NotificationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            NotificationStatus::Pending => write!(f, "pending"),
            NotificationStatus::Sent => write!(f, "sent"),
            NotificationStatus::Delivered => write!(f, "delivered"),
            NotificationStatus::Failed => write!(f, "failed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelState {
    Pending,
    Sending,
    Sent,
    Delivered,
    Failed,
}

/// Per-channel slot of the notification's status map. Only the final
/// failover outcome is retained per channel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelStatusEntry {
    pub state: ChannelState,
    pub provider_id: Option<String>,
    pub message_id: Option<String>,
    pub failure: Option<FailureKind>,
    pub error: Option<String>,
    pub delivered: u32,
    pub failed: u32,
    pub updated_at: DateTime<Utc>,
}

impl ChannelStatusEntry {
    pub fn pending() -> Self {
        Self {
            state: ChannelState::Pending,
            provider_id: None,
            message_id: None,
            failure: None,
            error: None,
            delivered: 0,
            failed: 0,
            updated_at: Utc::now(),
        }
    }

    pub fn sending() -> Self {
        Self {
            state: ChannelState::Sending,
            ..Self::pending()
        }
    }

    pub fn from_outcome(outcome: &ChannelOutcome) -> Self {
        Self {
            state: if outcome.success {
                ChannelState::Sent
            } else {
                ChannelState::Failed
            },
            provider_id: outcome.provider_id.clone(),
            message_id: outcome.message_id.clone(),
            failure: outcome.failure,
            error: outcome.error.clone(),
            delivered: outcome.delivered,
            failed: outcome.failed,
            updated_at: Utc::now(),
        }
    }
}

/// The "send this to this recipient" input. Not persisted; each accepted
/// intent produces exactly one new notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationIntent {
    pub recipient_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,

    /// Explicit channel override; empty means "let the router decide".
    #[serde(default)]
    pub channels: Vec<Channel>,

    #[serde(default)]
    pub priority: Priority,

    #[serde(default)]
    pub data: JsonValue,

    #[serde(default)]
    pub issuer_id: Option<String>,

    /// Explicit provider request; bypasses failover for that channel.
    #[serde(default)]
    pub provider_id: Option<String>,
}

impl NotificationIntent {
    pub fn new(
        recipient_id: impl Into<String>,
        notification_type: NotificationType,
        title: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            notification_type,
            title: title.into(),
            body: body.into(),
            channels: Vec::new(),
            priority: Priority::Normal,
            data: JsonValue::Null,
            issuer_id: None,
            provider_id: None,
        }
    }

    pub fn with_channels(mut self, channels: Vec<Channel>) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = data;
        self
    }

    pub fn with_issuer(mut self, issuer_id: impl Into<String>) -> Self {
        self.issuer_id = Some(issuer_id.into());
        self
    }

    pub fn with_provider(mut self, provider_id: impl Into<String>) -> Self {
        self.provider_id = Some(provider_id.into());
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub recipient_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub body: String,
    pub data: JsonValue,
    pub channels: Vec<Channel>,
    pub priority: Priority,
    pub status: NotificationStatus,
    pub channel_status: HashMap<Channel, ChannelStatusEntry>,
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub issuer_id: Option<String>,
}

impl Notification {
    pub fn from_intent(intent: &NotificationIntent, channels: Vec<Channel>) -> Self {
        let now = Utc::now();
        let channel_status = channels
            .iter()
            .map(|channel| (*channel, ChannelStatusEntry::pending()))
            .collect();

        Self {
            id: Uuid::new_v4().to_string(),
            recipient_id: intent.recipient_id.clone(),
            notification_type: intent.notification_type,
            title: intent.title.clone(),
            body: intent.body.clone(),
            data: intent.data.clone(),
            channels,
            priority: intent.priority,
            status: NotificationStatus::Pending,
            channel_status,
            read: false,
            created_at: now,
            updated_at: now,
            issuer_id: intent.issuer_id.clone(),
        }
    }
}
