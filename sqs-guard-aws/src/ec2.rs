//! EC2-backed VPC endpoint directory

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ec2::error::DisplayErrorContext;
use aws_sdk_ec2::types::Filter;
use aws_sdk_ec2::Client;
use tracing::debug;

use sqs_guard_core::{EndpointDirectory, GuardError, VpcEndpoint};

pub struct Ec2EndpointDirectory {
    client: Client,
}

impl Ec2EndpointDirectory {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl EndpointDirectory for Ec2EndpointDirectory {
    /// Single `DescribeVpcEndpoints` page filtered on `service-name`
    async fn list_endpoints(&self, service_name: &str) -> Result<Vec<VpcEndpoint>, GuardError> {
        let output = self
            .client
            .describe_vpc_endpoints()
            .filters(
                Filter::builder()
                    .name("service-name")
                    .values(service_name)
                    .build(),
            )
            .send()
            .await
            .map_err(|e| {
                GuardError::collaborator("DescribeVpcEndpoints", DisplayErrorContext(&e).to_string())
            })?;

        let endpoints: Vec<VpcEndpoint> = output
            .vpc_endpoints()
            .iter()
            .filter_map(|e| {
                let id = e.vpc_endpoint_id()?;
                let mut endpoint = VpcEndpoint::new(id, e.service_name().unwrap_or(service_name));
                if let Some(state) = e.state() {
                    endpoint = endpoint.with_state(state.as_str());
                }
                Some(endpoint)
            })
            .collect();

        debug!(service = %service_name, count = endpoints.len(), "Described VPC endpoints");
        Ok(endpoints)
    }
}
