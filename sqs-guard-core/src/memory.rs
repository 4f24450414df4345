//! In-memory collaborators
//!
//! Used for local dry runs and throughout the tests. Every call is recorded
//! by operation name so callers can assert on call order.

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::HashMap;

use crate::collaborator::{EndpointDirectory, QueueService, VpcEndpoint};
use crate::error::GuardError;
use crate::queue::short_name;

const DEFAULT_BASE_URL: &str = "https://sqs.us-east-1.amazonaws.com/000000000000";

#[derive(Debug, Default)]
struct InMemoryQueue {
    url: String,
    attributes: HashMap<String, String>,
    tags: HashMap<String, String>,
}

/// In-memory queue service keyed by queue name
pub struct InMemoryQueueService {
    base_url: String,
    queues: DashMap<String, InMemoryQueue>,
    calls: Mutex<Vec<&'static str>>,
    failure: Mutex<Option<(&'static str, String)>>,
}

impl Default for InMemoryQueueService {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl InMemoryQueueService {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            queues: DashMap::new(),
            calls: Mutex::new(Vec::new()),
            failure: Mutex::new(None),
        }
    }

    /// Create a queue and return its URL
    pub fn create_queue(&self, name: &str) -> String {
        let url = format!("{}/{}", self.base_url, name);
        self.queues
            .entry(name.to_string())
            .or_insert_with(|| InMemoryQueue {
                url: url.clone(),
                ..Default::default()
            });
        url
    }

    pub fn set_attribute(&self, name: &str, key: &str, value: &str) {
        if let Some(mut queue) = self.queues.get_mut(name) {
            queue.attributes.insert(key.to_string(), value.to_string());
        }
    }

    pub fn tag_queue(&self, name: &str, key: &str, value: &str) {
        if let Some(mut queue) = self.queues.get_mut(name) {
            queue.tags.insert(key.to_string(), value.to_string());
        }
    }

    /// Make `operation` fail with `message` from now on
    pub fn fail_on(&self, operation: &'static str, message: impl Into<String>) {
        *self.failure.lock() = Some((operation, message.into()));
    }

    /// Operations called so far, in order
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().clone()
    }

    fn record(&self, operation: &'static str) -> Result<(), GuardError> {
        self.calls.lock().push(operation);
        match &*self.failure.lock() {
            Some((op, message)) if *op == operation => {
                Err(GuardError::collaborator(operation, message.clone()))
            }
            _ => Ok(()),
        }
    }

    fn with_queue<T>(
        &self,
        queue_url: &str,
        f: impl FnOnce(&InMemoryQueue) -> T,
    ) -> Result<T, GuardError> {
        let name = short_name(queue_url);
        match self.queues.get(name) {
            Some(queue) if queue.url == queue_url => Ok(f(queue.value())),
            _ => Err(GuardError::QueueNotFound(name.to_string())),
        }
    }
}

#[async_trait]
impl QueueService for InMemoryQueueService {
    async fn resolve_queue_url(&self, queue_name: &str) -> Result<String, GuardError> {
        self.record("GetQueueUrl")?;
        self.queues
            .get(queue_name)
            .map(|q| q.url.clone())
            .ok_or_else(|| GuardError::QueueNotFound(queue_name.to_string()))
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
    ) -> Result<HashMap<String, String>, GuardError> {
        self.record("GetQueueAttributes")?;
        self.with_queue(queue_url, |q| q.attributes.clone())
    }

    async fn list_queue_tags(
        &self,
        queue_url: &str,
    ) -> Result<HashMap<String, String>, GuardError> {
        self.record("ListQueueTags")?;
        self.with_queue(queue_url, |q| q.tags.clone())
    }
}

/// Fixed set of VPC endpoints
#[derive(Default)]
pub struct StaticEndpointDirectory {
    endpoints: Vec<VpcEndpoint>,
    failure: Option<String>,
    queried: Mutex<Vec<String>>,
}

impl StaticEndpointDirectory {
    pub fn new(endpoints: Vec<VpcEndpoint>) -> Self {
        Self {
            endpoints,
            ..Default::default()
        }
    }

    /// A directory whose every lookup fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    /// Service names queried so far
    pub fn queried(&self) -> Vec<String> {
        self.queried.lock().clone()
    }
}

#[async_trait]
impl EndpointDirectory for StaticEndpointDirectory {
    async fn list_endpoints(&self, service_name: &str) -> Result<Vec<VpcEndpoint>, GuardError> {
        self.queried.lock().push(service_name.to_string());
        if let Some(message) = &self.failure {
            return Err(GuardError::collaborator("DescribeVpcEndpoints", message.clone()));
        }

        Ok(self
            .endpoints
            .iter()
            .filter(|e| e.service_name == service_name)
            .cloned()
            .collect())
    }
}
