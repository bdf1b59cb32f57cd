use crate::error::NotifyError;
use crate::models::notification::NotificationIntent;

const MAX_TITLE_LENGTH: usize = 200;

/// Shape checks applied before any side effect. Enum fields (type, channels,
/// priority) are already membership-checked by the type system.
pub fn validate_intent(intent: &NotificationIntent) -> Result<(), NotifyError> {
    if intent.recipient_id.trim().is_empty() {
        return Err(NotifyError::Validation(
            "recipient id cannot be empty".to_string(),
        ));
    }

    if intent.title.trim().is_empty() {
        return Err(NotifyError::Validation("title cannot be empty".to_string()));
    }

    if intent.title.len() > MAX_TITLE_LENGTH {
        return Err(NotifyError::Validation(format!(
            "title too long (maximum {} characters)",
            MAX_TITLE_LENGTH
        )));
    }

    if intent.body.trim().is_empty() {
        return Err(NotifyError::Validation(
            "message body cannot be empty".to_string(),
        ));
    }

    Ok(())
}
