//! SQS-backed queue service

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_sqs::error::DisplayErrorContext;
use aws_sdk_sqs::types::QueueAttributeName;
use aws_sdk_sqs::Client;
use std::collections::HashMap;
use tracing::debug;

use sqs_guard_core::{GuardError, QueueService};

pub struct SqsQueueService {
    client: Client,
}

impl SqsQueueService {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(Client::new(config))
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl QueueService for SqsQueueService {
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<String, GuardError> {
        let output = self
            .client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
            .map_err(|e| match e.as_service_error() {
                Some(err) if err.is_queue_does_not_exist() => {
                    GuardError::QueueNotFound(queue_name.to_string())
                }
                _ => GuardError::collaborator("GetQueueUrl", DisplayErrorContext(&e).to_string()),
            })?;

        let url = output
            .queue_url()
            .ok_or(GuardError::MalformedResponse("GetQueueUrl"))?;
        debug!(queue = %queue_name, url = %url, "Resolved queue URL");
        Ok(url.to_string())
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
    ) -> Result<HashMap<String, String>, GuardError> {
        let output = self
            .client
            .get_queue_attributes()
            .queue_url(queue_url)
            .attribute_names(QueueAttributeName::All)
            .send()
            .await
            .map_err(|e| {
                GuardError::collaborator("GetQueueAttributes", DisplayErrorContext(&e).to_string())
            })?;

        Ok(output
            .attributes()
            .map(|attrs| {
                attrs
                    .iter()
                    .map(|(k, v)| (k.as_str().to_string(), v.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn list_queue_tags(
        &self,
        queue_url: &str,
    ) -> Result<HashMap<String, String>, GuardError> {
        let output = self
            .client
            .list_queue_tags()
            .queue_url(queue_url)
            .send()
            .await
            .map_err(|e| {
                GuardError::collaborator("ListQueueTags", DisplayErrorContext(&e).to_string())
            })?;

        Ok(output.tags().cloned().unwrap_or_default())
    }
}
