use crate::models::{
    channel::Channel,
    notification::{NotificationIntent, NotificationType},
    recipient::RecipientProfile,
};

/// Decides the channel set for a notification. An explicit channel list on
/// the intent wins; otherwise a static per-type default table applies.
/// The router never drops an undeliverable channel silently; "no address"
/// surfaces at dispatch time as a distinct per-channel failure.
pub struct ChannelRouter;

impl ChannelRouter {
    pub fn resolve(intent: &NotificationIntent, profile: &RecipientProfile) -> Vec<Channel> {
        if !intent.channels.is_empty() {
            return dedupe(&intent.channels);
        }

        match intent.notification_type {
            NotificationType::EventCancelled => {
                vec![Channel::Email, Channel::Sms, Channel::Push]
            }
            NotificationType::EventUpdated => vec![Channel::Email, Channel::Push],
            NotificationType::AppointmentReminder => vec![Channel::Push],
            NotificationType::Announcement => vec![Channel::InApp, Channel::Email],
            NotificationType::LeaveStatus | NotificationType::General => {
                let mut channels = vec![Channel::InApp];
                if profile.email.is_some() {
                    channels.push(Channel::Email);
                }
                channels
            }
        }
    }
}

fn dedupe(channels: &[Channel]) -> Vec<Channel> {
    let mut seen = Vec::with_capacity(channels.len());
    for channel in channels {
        if !seen.contains(channel) {
            seen.push(*channel);
        }
    }
    seen
}
