use serde::{Deserialize, Serialize};

use crate::models::channel::{Channel, ChannelAddress};

/// Contact surface of one recipient, as returned by the profile provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecipientProfile {
    pub recipient_id: String,

    #[serde(default)]
    pub email: Option<String>,

    #[serde(default)]
    pub phone_number: Option<String>,

    #[serde(default)]
    pub push_tokens: Vec<String>,
}

impl RecipientProfile {
    pub fn new(recipient_id: impl Into<String>) -> Self {
        Self {
            recipient_id: recipient_id.into(),
            ..Self::default()
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_phone(mut self, phone_number: impl Into<String>) -> Self {
        self.phone_number = Some(phone_number.into());
        self
    }

    pub fn with_push_tokens(mut self, push_tokens: Vec<String>) -> Self {
        self.push_tokens = push_tokens;
        self
    }

    /// The address a channel needs, or `None` when the recipient has nothing
    /// on file for it. In-app needs no address.
    pub fn address(&self, channel: Channel) -> Option<ChannelAddress> {
        match channel {
            Channel::Email => self.email.clone().map(ChannelAddress::Email),
            Channel::Sms => self.phone_number.clone().map(ChannelAddress::Phone),
            Channel::Push => {
                if self.push_tokens.is_empty() {
                    None
                } else {
                    Some(ChannelAddress::PushTokens(self.push_tokens.clone()))
                }
            }
            Channel::InApp => None,
        }
    }
}
