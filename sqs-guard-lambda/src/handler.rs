//! Invocation handlers

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use sqs_guard_core::Auditor;

use crate::invocation::{InvocationContext, LambdaErrorResponse};

/// Handles one decoded event
#[async_trait]
pub trait Handler: Send + Sync {
    async fn call(
        &self,
        event: Value,
        context: InvocationContext,
    ) -> Result<Value, LambdaErrorResponse>;
}

/// Runs a queue audit per event.
///
/// Findings only produce log lines; the response body is always `null`.
pub struct AuditHandler {
    auditor: Auditor,
}

impl AuditHandler {
    pub fn new(auditor: Auditor) -> Self {
        Self { auditor }
    }
}

#[async_trait]
impl Handler for AuditHandler {
    async fn call(
        &self,
        event: Value,
        context: InvocationContext,
    ) -> Result<Value, LambdaErrorResponse> {
        debug!(
            remaining_ms = context.remaining_time().as_millis() as u64,
            "Starting audit"
        );
        self.auditor.audit(&event).await?;
        Ok(Value::Null)
    }
}
