//! The queue audit handler
//!
//! One call to [`Auditor::audit`] handles one trigger event: it resolves the
//! target queue, then queries endpoints, attributes and tags strictly in that
//! order, raising an alert for each violation as soon as it is found.
//! Any collaborator failure aborts the audit; alerts already raised stay
//! raised.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

use crate::alert::{AlertSink, LogAlertSink};
use crate::checks;
use crate::collaborator::{EndpointDirectory, QueueService};
use crate::error::GuardError;
use crate::event::queue_url_from_event;
use crate::finding::Finding;
use crate::policy::AuditPolicy;
use crate::queue::{QueueRef, QueueTarget};

/// Fixed per-process settings
#[derive(Debug, Clone, Default)]
pub struct AuditSettings {
    /// Queue URL or name that overrides the trigger event
    pub queue_override: Option<QueueTarget>,
    pub policy: AuditPolicy,
}

/// Outcome of a completed audit
#[derive(Debug, Clone)]
pub struct AuditReport {
    pub queue: QueueRef,
    pub findings: Vec<Finding>,
}

impl AuditReport {
    pub fn is_compliant(&self) -> bool {
        self.findings.is_empty()
    }
}

pub struct Auditor {
    queues: Arc<dyn QueueService>,
    endpoints: Arc<dyn EndpointDirectory>,
    alerts: Arc<dyn AlertSink>,
    settings: AuditSettings,
}

impl Auditor {
    pub fn new(
        queues: Arc<dyn QueueService>,
        endpoints: Arc<dyn EndpointDirectory>,
        settings: AuditSettings,
    ) -> Self {
        Self {
            queues,
            endpoints,
            alerts: Arc::new(LogAlertSink),
            settings,
        }
    }

    pub fn with_alert_sink(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn settings(&self) -> &AuditSettings {
        &self.settings
    }

    /// Audit the queue named by the override or by `event`
    pub async fn audit(&self, event: &Value) -> Result<AuditReport, GuardError> {
        info!(event = %event, "Received event");

        let queue = self.resolve_queue(event).await?;
        let name = queue.short_name().to_string();
        let policy = &self.settings.policy;
        let mut findings = Vec::new();

        let service_name = policy.service_name();
        let endpoints = self.endpoints.list_endpoints(&service_name).await?;
        debug!(service = %service_name, count = endpoints.len(), "VPC endpoints");
        self.raise(checks::vpc_endpoint(&name, &endpoints, policy), &mut findings);

        let attributes = self.queues.get_queue_attributes(queue.url()).await?;
        self.raise(checks::encryption(&name, &attributes, policy), &mut findings);

        let tags = self.queues.list_queue_tags(queue.url()).await?;
        self.raise(checks::required_tags(&name, &tags, policy), &mut findings);

        info!(queue = %name, findings = findings.len(), "Audit complete");

        Ok(AuditReport { queue, findings })
    }

    async fn resolve_queue(&self, event: &Value) -> Result<QueueRef, GuardError> {
        match &self.settings.queue_override {
            Some(target) => {
                info!(
                    queue = %target.as_str(),
                    "Using SQS queue URL or name from environment variable"
                );
                let url = match target {
                    QueueTarget::Url(url) => url.clone(),
                    QueueTarget::Name(name) => self.queues.resolve_queue_url(name).await?,
                };
                Ok(QueueRef::new(url))
            }
            None => {
                info!("Extracting SQS queue URL from the event");
                Ok(QueueRef::new(queue_url_from_event(event)?))
            }
        }
    }

    fn raise(&self, detected: impl IntoIterator<Item = Finding>, findings: &mut Vec<Finding>) {
        for finding in detected {
            self.alerts.alert(&finding);
            findings.push(finding);
        }
    }
}
