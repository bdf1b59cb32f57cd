use std::fmt::{Display, Formatter, Result};

use serde::{Deserialize, Serialize};

/// A delivery medium. In-app delivery is satisfied by persistence itself;
/// the other channels go through registered providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Email,
    Sms,
    Push,
    InApp,
}

impl Channel {
    pub const ALL: [Channel; 4] = [Channel::Email, Channel::Sms, Channel::Push, Channel::InApp];
}

impl Display for Channel {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Channel::Email => write!(f, "email"),
            Channel::Sms => write!(f, "sms"),
            Channel::Push => write!(f, "push"),
            Channel::InApp => write!(f, "in_app"),
        }
    }
}

/// Channel-specific recipient address, matched exhaustively by providers.
#[derive(Debug, Clone)]
pub enum ChannelAddress {
    Email(String),
    Phone(String),
    PushTokens(Vec<String>),
}

/// One rendered message handed to a provider for a single recipient.
#[derive(Debug, Clone)]
pub struct Delivery {
    pub address: ChannelAddress,
    pub title: String,
    pub body: String,
    pub data: serde_json::Value,
    pub trace_id: String,
}

/// What a provider reports back on acceptance. `delivered`/`failed` carry
/// per-token counts for push; single-address channels report 1/0.
#[derive(Debug, Clone, Default)]
pub struct ProviderReceipt {
    pub message_id: Option<String>,
    pub delivered: u32,
    pub failed: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    NoProvidersAvailable,
    NoAddressOnFile,
    Provider,
}

/// Final outcome of one channel's dispatch, after failover has settled.
#[derive(Debug, Clone)]
pub struct ChannelOutcome {
    pub channel: Channel,
    pub success: bool,
    pub provider_id: Option<String>,
    pub message_id: Option<String>,
    pub failure: Option<FailureKind>,
    pub error: Option<String>,
    pub delivered: u32,
    pub failed: u32,
}

impl ChannelOutcome {
    pub fn sent(channel: Channel, provider_id: Option<String>, receipt: ProviderReceipt) -> Self {
        Self {
            channel,
            success: true,
            provider_id,
            message_id: receipt.message_id,
            failure: None,
            error: None,
            delivered: receipt.delivered,
            failed: receipt.failed,
        }
    }

    pub fn failed(
        channel: Channel,
        provider_id: Option<String>,
        error: &crate::error::NotifyError,
    ) -> Self {
        Self {
            channel,
            success: false,
            provider_id,
            message_id: None,
            failure: error.failure_kind(),
            error: Some(error.to_string()),
            delivered: 0,
            failed: 0,
        }
    }
}
