//! AWS collaborator traits
//!
//! The auditor only reads from AWS. Both traits are object safe so that the
//! binary can hand in SDK-backed clients and tests can hand in the in-memory
//! ones from [`crate::memory`].

use async_trait::async_trait;
use std::collections::HashMap;

use crate::error::GuardError;

/// Read-only view of the SQS API
#[async_trait]
pub trait QueueService: Send + Sync {
    /// Resolve a queue name to its URL, failing if the queue does not exist
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<String, GuardError>;

    /// Fetch all attributes of a queue (`AttributeNames=All`)
    async fn get_queue_attributes(
        &self,
        queue_url: &str,
    ) -> Result<HashMap<String, String>, GuardError>;

    /// Fetch the tags of a queue; no tags is an empty map
    async fn list_queue_tags(&self, queue_url: &str)
        -> Result<HashMap<String, String>, GuardError>;
}

/// Read-only view of the EC2 VPC endpoint API
#[async_trait]
pub trait EndpointDirectory: Send + Sync {
    /// VPC endpoints whose service name matches `service_name`
    async fn list_endpoints(&self, service_name: &str) -> Result<Vec<VpcEndpoint>, GuardError>;
}

/// A VPC endpoint as reported by EC2
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VpcEndpoint {
    pub id: String,
    pub service_name: String,
    pub state: Option<String>,
}

impl VpcEndpoint {
    pub fn new(id: impl Into<String>, service_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            service_name: service_name.into(),
            state: None,
        }
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }
}
