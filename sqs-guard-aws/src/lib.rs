//! AWS SDK collaborators for SQS Guard
//!
//! Implements the core collaborator traits on top of `aws-sdk-sqs` and
//! `aws-sdk-ec2`. Clients are built once from a shared `SdkConfig` and
//! reused for every invocation.

pub mod ec2;
pub mod sqs;

pub use ec2::Ec2EndpointDirectory;
pub use sqs::SqsQueueService;

use aws_config::{BehaviorVersion, SdkConfig};

/// Load SDK configuration from the environment (region, credentials and
/// `AWS_ENDPOINT_URL`), as provided by the Lambda execution environment.
pub async fn load_sdk_config() -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest()).load().await
}
