//! Core types and the audit handler for SQS Guard
//!
//! This crate holds everything that does not talk to AWS directly:
//! the queue reference model, the audit policy, typed findings, the
//! collaborator traits and the `Auditor` that ties them together.

pub mod alert;
pub mod audit;
pub mod checks;
pub mod collaborator;
pub mod error;
pub mod event;
pub mod finding;
pub mod memory;
pub mod policy;
pub mod queue;

pub use alert::{AlertSink, LogAlertSink};
pub use audit::{AuditReport, AuditSettings, Auditor};
pub use collaborator::{EndpointDirectory, QueueService, VpcEndpoint};
pub use error::GuardError;
pub use finding::Finding;
pub use memory::{InMemoryQueueService, StaticEndpointDirectory};
pub use policy::AuditPolicy;
pub use queue::{short_name, QueueRef, QueueTarget};
