use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::NotifyError;
use crate::models::{
    channel::Channel,
    notification::{ChannelStatusEntry, Notification, NotificationStatus},
};

/// Persistence boundary for notifications. Supports per-field partial
/// updates so channel outcomes can be written independently.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(&self, notification: &Notification) -> Result<(), NotifyError>;

    async fn get(&self, id: &str) -> Result<Option<Notification>, NotifyError>;

    async fn update_status(&self, id: &str, status: NotificationStatus)
    -> Result<(), NotifyError>;

    async fn update_channel_status(
        &self,
        id: &str,
        channel: Channel,
        entry: ChannelStatusEntry,
    ) -> Result<(), NotifyError>;

    async fn unread_count(&self, recipient_id: &str) -> Result<u64, NotifyError>;

    async fn mark_read(&self, id: &str, recipient_id: &str) -> Result<(), NotifyError>;

    async fn mark_all_read(&self, recipient_id: &str) -> Result<u64, NotifyError>;
}

/// In-memory store, the default for tests and single-process deployments.
#[derive(Default)]
pub struct InMemoryNotificationStore {
    items: Mutex<HashMap<String, Notification>>,
}

impl InMemoryNotificationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl NotificationStore for InMemoryNotificationStore {
    async fn create(&self, notification: &Notification) -> Result<(), NotifyError> {
        let mut items = self.items.lock().unwrap();
        items.insert(notification.id.clone(), notification.clone());
        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Notification>, NotifyError> {
        let items = self.items.lock().unwrap();
        Ok(items.get(id).cloned())
    }

    async fn update_status(
        &self,
        id: &str,
        status: NotificationStatus,
    ) -> Result<(), NotifyError> {
        let mut items = self.items.lock().unwrap();
        let notification = items
            .get_mut(id)
            .ok_or_else(|| NotifyError::Store(format!("notification not found: {}", id)))?;

        notification.status = status;
        notification.updated_at = Utc::now();
        Ok(())
    }

    async fn update_channel_status(
        &self,
        id: &str,
        channel: Channel,
        entry: ChannelStatusEntry,
    ) -> Result<(), NotifyError> {
        let mut items = self.items.lock().unwrap();
        let notification = items
            .get_mut(id)
            .ok_or_else(|| NotifyError::Store(format!("notification not found: {}", id)))?;

        notification.channel_status.insert(channel, entry);
        notification.updated_at = Utc::now();
        Ok(())
    }

    async fn unread_count(&self, recipient_id: &str) -> Result<u64, NotifyError> {
        let items = self.items.lock().unwrap();
        Ok(items
            .values()
            .filter(|n| n.recipient_id == recipient_id && !n.read)
            .count() as u64)
    }

    async fn mark_read(&self, id: &str, recipient_id: &str) -> Result<(), NotifyError> {
        let mut items = self.items.lock().unwrap();
        let notification = items
            .get_mut(id)
            .ok_or_else(|| NotifyError::Store(format!("notification not found: {}", id)))?;

        if notification.recipient_id != recipient_id {
            return Err(NotifyError::Validation(
                "notification does not belong to recipient".to_string(),
            ));
        }

        notification.read = true;
        notification.updated_at = Utc::now();
        Ok(())
    }

    async fn mark_all_read(&self, recipient_id: &str) -> Result<u64, NotifyError> {
        let mut items = self.items.lock().unwrap();
        let mut updated = 0u64;

        for notification in items.values_mut() {
            if notification.recipient_id == recipient_id && !notification.read {
                notification.read = true;
                notification.updated_at = Utc::now();
                updated += 1;
            }
        }

        Ok(updated)
    }
}
