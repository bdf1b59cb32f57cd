use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::notification::NotificationType;

/// Answer from a rate-limit check. `retry_after_seconds` is only present on
/// denial, rounded up to whole seconds.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
    pub retry_after_seconds: Option<u64>,
}

/// Process-local window state, keyed by (recipient, notification type).
#[derive(Debug, Clone)]
pub struct RateLimitEntry {
    pub count: u32,
    pub reset_at_ms: i64,
}

impl NotificationType {
    /// Maximum sends per recipient per window. Reminders are high-volume;
    /// announcements arrive via bulk sends and get a tight budget.
    pub fn max_per_window(&self) -> u32 {
        match self {
            NotificationType::AppointmentReminder => 30,
            NotificationType::EventCancelled | NotificationType::EventUpdated => 10,
            NotificationType::Announcement => 5,
            NotificationType::LeaveStatus | NotificationType::General => 10,
        }
    }
}
