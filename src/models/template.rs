use serde::{Deserialize, Serialize};

use crate::models::channel::Channel;

/// A stored message template. Immutable once fetched for a given send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Template {
    pub id: String,
    pub name: String,
    pub subject: String,
    pub body: String,

    /// Declared variable names, used for pre-send missing-variable warnings.
    #[serde(default)]
    pub variables: Vec<String>,

    /// Preferred channel when the caller does not override.
    #[serde(default)]
    pub channel: Option<Channel>,
}
