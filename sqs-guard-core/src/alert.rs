//! Alert delivery

use tracing::error;

use crate::finding::Finding;

/// Receives every finding as soon as it is detected
pub trait AlertSink: Send + Sync {
    fn alert(&self, finding: &Finding);
}

/// Writes each finding at ERROR level.
///
/// Other notification channels (SNS, chat) would implement [`AlertSink`].
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn alert(&self, finding: &Finding) {
        error!(queue = %finding.queue(), kind = finding.kind(), "{}", finding);
    }
}
