//! Lambda Runtime API client for SQS Guard
//!
//! Runs the audit as a custom Lambda runtime: poll the Runtime API for the
//! next event, hand it to a [`Handler`], and post the result back.

pub mod handler;
pub mod invocation;
pub mod runtime;

pub use handler::{AuditHandler, Handler};
pub use invocation::{Invocation, InvocationContext, LambdaErrorResponse};
pub use runtime::{Runtime, RuntimeError};
