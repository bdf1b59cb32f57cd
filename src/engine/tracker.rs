use std::collections::HashMap;
use std::sync::Arc;

use crate::clients::store::NotificationStore;
use crate::error::NotifyError;
use crate::models::{
    channel::{Channel, ChannelOutcome},
    notification::{ChannelState, ChannelStatusEntry, NotificationStatus},
};

/// Writes per-channel attempt outcomes back to the store and folds the
/// per-channel map into one overall status.
#[derive(Clone)]
pub struct DeliveryTracker {
    store: Arc<dyn NotificationStore>,
}

impl DeliveryTracker {
    pub fn new(store: Arc<dyn NotificationStore>) -> Self {
        Self { store }
    }

    pub async fn mark_sending(
        &self,
        notification_id: &str,
        channel: Channel,
    ) -> Result<(), NotifyError> {
        self.store
            .update_channel_status(notification_id, channel, ChannelStatusEntry::sending())
            .await
    }

    pub async fn record_attempt(
        &self,
        notification_id: &str,
        outcome: &ChannelOutcome,
    ) -> Result<(), NotifyError> {
        self.store
            .update_channel_status(
                notification_id,
                outcome.channel,
                ChannelStatusEntry::from_outcome(outcome),
            )
            .await
    }

    /// Overall status once every channel has settled: `Sent` when all
    /// reached sent/delivered, `Failed` when at least one failed and none
    /// succeeded, `Pending` for anything in between.
    pub fn aggregate_status(
        channel_status: &HashMap<Channel, ChannelStatusEntry>,
    ) -> NotificationStatus {
        if channel_status.is_empty() {
            return NotificationStatus::Pending;
        }

        let succeeded = channel_status
            .values()
            .filter(|e| matches!(e.state, ChannelState::Sent | ChannelState::Delivered))
            .count();
        let failed = channel_status
            .values()
            .filter(|e| e.state == ChannelState::Failed)
            .count();

        if succeeded == channel_status.len() {
            NotificationStatus::Sent
        } else if failed > 0 && succeeded == 0 {
            NotificationStatus::Failed
        } else {
            NotificationStatus::Pending
        }
    }
}
