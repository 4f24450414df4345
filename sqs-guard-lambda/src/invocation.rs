//! Lambda invocation handling

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use sqs_guard_core::GuardError;

/// An event fetched from `/runtime/invocation/next`
#[derive(Debug)]
pub struct Invocation {
    pub context: InvocationContext,
    pub payload: Bytes,
}

/// Per-invocation metadata from the Runtime API headers
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub request_id: String,
    pub invoked_function_arn: String,
    pub deadline_ms: i64,
    pub trace_id: Option<String>,
}

impl InvocationContext {
    /// Time left before the function deadline
    pub fn remaining_time(&self) -> Duration {
        let now = chrono::Utc::now().timestamp_millis();
        Duration::from_millis(self.deadline_ms.saturating_sub(now).max(0) as u64)
    }
}

/// Lambda error response format
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LambdaErrorResponse {
    pub error_message: String,
    pub error_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<Vec<String>>,
}

impl LambdaErrorResponse {
    pub fn new(error_type: impl Into<String>, error_message: impl Into<String>) -> Self {
        Self {
            error_message: error_message.into(),
            error_type: error_type.into(),
            stack_trace: None,
        }
    }
}

impl From<GuardError> for LambdaErrorResponse {
    fn from(error: GuardError) -> Self {
        Self::new(error.error_type(), error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_format() {
        let error = LambdaErrorResponse::new("SqsGuard.QueueNotFound", "Queue does not exist: q");
        let json = serde_json::to_value(&error).unwrap();

        assert_eq!(json["errorType"], "SqsGuard.QueueNotFound");
        assert_eq!(json["errorMessage"], "Queue does not exist: q");
        assert!(json.get("stackTrace").is_none());
    }

    #[test]
    fn test_from_guard_error() {
        let error: LambdaErrorResponse = GuardError::QueueNotFound("orders".into()).into();
        assert_eq!(error.error_type, "SqsGuard.QueueNotFound");
        assert_eq!(error.error_message, "Queue does not exist: orders");
    }

    #[test]
    fn test_remaining_time() {
        let mut context = InvocationContext {
            request_id: "req-1".into(),
            invoked_function_arn: String::new(),
            deadline_ms: chrono::Utc::now().timestamp_millis() + 60_000,
            trace_id: None,
        };
        let remaining = context.remaining_time();
        assert!(remaining > Duration::from_secs(50));
        assert!(remaining <= Duration::from_secs(60));

        context.deadline_ms = 0;
        assert_eq!(context.remaining_time(), Duration::ZERO);
    }

    #[test]
    fn test_remaining_time_extreme_deadlines() {
        let mut context = InvocationContext {
            request_id: "req-1".into(),
            invoked_function_arn: String::new(),
            deadline_ms: i64::MIN,
            trace_id: None,
        };
        assert_eq!(context.remaining_time(), Duration::ZERO);

        context.deadline_ms = i64::MAX;
        assert!(context.remaining_time() > Duration::from_secs(60 * 60 * 24 * 365));
    }
}
