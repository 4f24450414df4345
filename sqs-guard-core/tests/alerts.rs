//! Alert output of a full audit, asserted on captured log lines

use serde_json::{json, Value};
use std::sync::Arc;

use sqs_guard_core::checks::KMS_MASTER_KEY_ID;
use sqs_guard_core::{
    AuditSettings, Auditor, InMemoryQueueService, StaticEndpointDirectory, VpcEndpoint,
};
use sqs_guard_test::LogCapture;

const CMK: &str = "arn:aws:kms:us-east-1:123:key/abc";

struct Fixture {
    sqs: Arc<InMemoryQueueService>,
    url: String,
    endpoints: Vec<VpcEndpoint>,
}

impl Fixture {
    /// A queue that passes every check
    fn compliant() -> Self {
        let sqs = Arc::new(InMemoryQueueService::default());
        let url = sqs.create_queue("orders");
        sqs.set_attribute("orders", KMS_MASTER_KEY_ID, CMK);
        for tag in ["Name", "Created By", "Environment"] {
            sqs.tag_queue("orders", tag, "x");
        }
        Self {
            sqs,
            url,
            endpoints: vec![VpcEndpoint::new("vpce-1", "com.amazonaws.us-east-1.sqs")],
        }
    }

    /// Same queue, without the tags and key
    fn bare() -> Self {
        let sqs = Arc::new(InMemoryQueueService::default());
        let url = sqs.create_queue("orders");
        Self {
            sqs,
            url,
            endpoints: vec![VpcEndpoint::new("vpce-1", "com.amazonaws.us-east-1.sqs")],
        }
    }

    fn event(&self) -> Value {
        json!({ "detail": { "responseElements": { "queueUrl": self.url } } })
    }

    async fn run(self) -> (LogCapture, bool) {
        let auditor = Auditor::new(
            self.sqs.clone(),
            Arc::new(StaticEndpointDirectory::new(self.endpoints.clone())),
            AuditSettings::default(),
        );
        let (logs, _guard) = LogCapture::install();
        let ok = auditor.audit(&self.event()).await.is_ok();
        (logs, ok)
    }
}

#[tokio::test]
async fn test_compliant_queue_logs_no_alerts() {
    let (logs, ok) = Fixture::compliant().run().await;

    assert!(ok);
    assert!(logs.errors().is_empty());
}

#[tokio::test]
async fn test_missing_endpoint_logs_one_alert() {
    let mut fixture = Fixture::compliant();
    fixture.endpoints.clear();
    let (logs, ok) = fixture.run().await;

    assert!(ok);
    let errors = logs.errors();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("No VPC endpoint found for SQS in us-east-1 for queue orders"));
}

#[tokio::test]
async fn test_unencrypted_queue_logs_one_encryption_alert() {
    let fixture = Fixture::bare();
    for tag in ["Name", "Created By", "Environment"] {
        fixture.sqs.tag_queue("orders", tag, "x");
    }
    let (logs, _) = fixture.run().await;

    assert_eq!(logs.errors_containing("does not have encryption enabled").len(), 1);
    assert!(logs.errors_containing("customer-managed key").is_empty());
    assert_eq!(logs.errors().len(), 1);
}

#[tokio::test]
async fn test_aws_managed_key_logs_cmk_alert() {
    let fixture = Fixture::compliant();
    fixture.sqs.set_attribute("orders", KMS_MASTER_KEY_ID, "alias/aws/sqs");
    let (logs, _) = fixture.run().await;

    assert_eq!(
        logs.errors_containing("Queue orders is not using a customer-managed key (CMK).")
            .len(),
        1
    );
    assert_eq!(logs.errors().len(), 1);
}

#[tokio::test]
async fn test_each_missing_tag_logged() {
    let fixture = Fixture::bare();
    fixture.sqs.set_attribute("orders", KMS_MASTER_KEY_ID, CMK);
    fixture.sqs.tag_queue("orders", "Name", "x");
    let (logs, _) = fixture.run().await;

    let errors = logs.errors();
    assert_eq!(errors.len(), 2);
    assert!(errors[0].contains("Queue orders is missing required tag: Created By"));
    assert!(errors[1].contains("Queue orders is missing required tag: Environment"));
}

#[tokio::test]
async fn test_findings_do_not_fail_invocation() {
    let mut fixture = Fixture::bare();
    fixture.endpoints.clear();
    let (logs, ok) = fixture.run().await;

    assert!(ok);
    assert_eq!(logs.errors().len(), 5);
}
