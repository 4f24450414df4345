//! Trigger event parsing

use serde_json::Value;

use crate::error::GuardError;

/// JSON pointer to the queue URL in a CloudTrail `CreateQueue` event
pub const QUEUE_URL_POINTER: &str = "/detail/responseElements/queueUrl";

/// Extract the queue URL from an EventBridge/CloudTrail event
pub fn queue_url_from_event(event: &Value) -> Result<&str, GuardError> {
    event
        .pointer(QUEUE_URL_POINTER)
        .and_then(Value::as_str)
        .ok_or(GuardError::MissingQueueUrl(QUEUE_URL_POINTER))
}
