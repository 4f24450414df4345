//! Integration tests for the AWS collaborators
//!
//! These tests drive the real SDK clients against a local stub endpoint.

use std::sync::Arc;

use aws_config::{BehaviorVersion, SdkConfig};
use aws_sdk_sqs::config::{Credentials, Region};
use serde_json::json;

use sqs_guard_aws::{Ec2EndpointDirectory, SqsQueueService};
use sqs_guard_core::{
    AuditSettings, Auditor, EndpointDirectory, GuardError, QueueService, QueueTarget,
};
use sqs_guard_test::{LogCapture, StubAws};

const SQS_SERVICE: &str = "com.amazonaws.us-east-1.sqs";

/// SDK config pointing at the stub
async fn create_test_config(endpoint: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(endpoint)
        .credentials_provider(Credentials::new("test", "test", None, None, "test"))
        .region(Region::new("us-east-1"))
        .load()
        .await
}

#[tokio::test]
async fn test_resolve_queue_url() {
    let aws = StubAws::start().await.unwrap();
    let url = aws.create_queue("orders");
    let sqs = SqsQueueService::new(&create_test_config(&aws.url()).await);

    assert_eq!(sqs.resolve_queue_url("orders").await.unwrap(), url);
    assert_eq!(aws.requests(), vec!["AmazonSQS.GetQueueUrl"]);
}

#[tokio::test]
async fn test_resolve_unknown_queue_fails() {
    let aws = StubAws::start().await.unwrap();
    let sqs = SqsQueueService::new(&create_test_config(&aws.url()).await);

    let err = sqs.resolve_queue_url("ghost").await.unwrap_err();
    assert!(matches!(&err, GuardError::QueueNotFound(name) if name == "ghost"));
    assert_eq!(err.error_type(), "SqsGuard.QueueNotFound");
}

#[tokio::test]
async fn test_get_queue_attributes() {
    let aws = StubAws::start().await.unwrap();
    let url = aws.create_queue("orders");
    aws.set_attribute("orders", "KmsMasterKeyId", "alias/aws/sqs");
    let sqs = SqsQueueService::new(&create_test_config(&aws.url()).await);

    let attributes = sqs.get_queue_attributes(&url).await.unwrap();
    assert_eq!(attributes["KmsMasterKeyId"], "alias/aws/sqs");
    assert!(attributes.contains_key("QueueArn"));
}

#[tokio::test]
async fn test_list_queue_tags() {
    let aws = StubAws::start().await.unwrap();
    let url = aws.create_queue("orders");
    let sqs = SqsQueueService::new(&create_test_config(&aws.url()).await);

    assert!(sqs.list_queue_tags(&url).await.unwrap().is_empty());

    aws.tag_queue("orders", "Created By", "platform");
    let tags = sqs.list_queue_tags(&url).await.unwrap();
    assert_eq!(tags.len(), 1);
    assert_eq!(tags["Created By"], "platform");
}

#[tokio::test]
async fn test_list_endpoints_filters_by_service_name() {
    let aws = StubAws::start().await.unwrap();
    aws.add_vpc_endpoint("vpce-0sqs", SQS_SERVICE);
    aws.add_vpc_endpoint("vpce-0s3", "com.amazonaws.us-east-1.s3");
    let ec2 = Ec2EndpointDirectory::new(&create_test_config(&aws.url()).await);

    let endpoints = ec2.list_endpoints(SQS_SERVICE).await.unwrap();
    assert_eq!(endpoints.len(), 1);
    assert_eq!(endpoints[0].id, "vpce-0sqs");
    assert_eq!(endpoints[0].service_name, SQS_SERVICE);
    assert_eq!(endpoints[0].state.as_deref(), Some("available"));
    assert_eq!(
        aws.requests(),
        vec![format!("DescribeVpcEndpoints service-name={}", SQS_SERVICE)]
    );
}

#[tokio::test]
async fn test_no_endpoints() {
    let aws = StubAws::start().await.unwrap();
    let ec2 = Ec2EndpointDirectory::new(&create_test_config(&aws.url()).await);

    assert!(ec2.list_endpoints(SQS_SERVICE).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_ec2_denied_is_an_error() {
    let aws = StubAws::start().await.unwrap();
    aws.deny_ec2();
    let ec2 = Ec2EndpointDirectory::new(&create_test_config(&aws.url()).await);

    assert!(ec2.list_endpoints(SQS_SERVICE).await.is_err());
}

#[tokio::test]
async fn test_audit_through_sdk_clients() {
    let aws = StubAws::start().await.unwrap();
    aws.create_queue("orders");
    aws.set_attribute("orders", "KmsMasterKeyId", "arn:aws:kms:us-east-1:123:key/abc");
    aws.tag_queue("orders", "Name", "orders");
    aws.tag_queue("orders", "Created By", "platform");
    aws.add_vpc_endpoint("vpce-0sqs", SQS_SERVICE);

    let config = create_test_config(&aws.url()).await;
    let settings = AuditSettings {
        queue_override: QueueTarget::parse("orders"),
        ..Default::default()
    };
    let auditor = Auditor::new(
        Arc::new(SqsQueueService::new(&config)),
        Arc::new(Ec2EndpointDirectory::new(&config)),
        settings,
    );

    let (logs, _guard) = LogCapture::install();
    let report = auditor.audit(&json!({})).await.unwrap();

    assert_eq!(report.queue.short_name(), "orders");
    assert_eq!(
        logs.errors_containing("Queue orders is missing required tag: Environment")
            .len(),
        1
    );
    assert_eq!(logs.errors_containing("Queue orders").len(), 1);
    assert_eq!(
        aws.requests(),
        vec![
            "AmazonSQS.GetQueueUrl".to_string(),
            format!("DescribeVpcEndpoints service-name={}", SQS_SERVICE),
            "AmazonSQS.GetQueueAttributes".to_string(),
            "AmazonSQS.ListQueueTags".to_string(),
        ]
    );
}
