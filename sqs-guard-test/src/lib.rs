//! Test utilities for SQS Guard
//!
//! Provides the pieces integration tests need to exercise the function
//! without AWS:
//! - Capture tracing output and assert on alert lines
//! - A fake Lambda Runtime API that queues events and records outcomes
//! - A stub AWS endpoint speaking the SQS JSON and EC2 query protocols
//!
//! ## Usage
//!
//! ```rust,no_run
//! use sqs_guard_test::{FakeRuntimeApi, StubAws};
//!
//! #[tokio::test]
//! async fn test_invocation() {
//!     let aws = StubAws::start().await.unwrap();
//!     aws.create_queue("orders");
//!
//!     let runtime_api = FakeRuntimeApi::start().await.unwrap();
//!     let request_id = runtime_api.enqueue(serde_json::json!({}));
//!     // point the runtime client at runtime_api.host() and aws.url()
//! }
//! ```

pub mod aws_stub;
pub mod logs;
pub mod runtime_api;
pub mod server;

pub use aws_stub::StubAws;
pub use logs::LogCapture;
pub use runtime_api::{FakeRuntimeApi, InvocationOutcome};
pub use server::{TestError, TestServer};

/// Timeout for waiting on a recorded outcome
pub const OUTCOME_TIMEOUT_SECS: u64 = 5;
