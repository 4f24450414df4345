//! Fake Lambda Runtime API
//!
//! Serves the `2018-06-01` runtime endpoints a custom runtime polls.
//! Tests queue events with [`FakeRuntimeApi::enqueue`] and read back what the
//! runtime posted with [`FakeRuntimeApi::next_outcome`].

use axum::{
    body::Body,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use bytes::Bytes;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::server::{TestError, TestServer};
use crate::OUTCOME_TIMEOUT_SECS;

pub const FUNCTION_ARN: &str = "arn:aws:lambda:us-east-1:000000000000:function:sqs-guard";

struct QueuedInvocation {
    request_id: String,
    payload: Bytes,
    trace_id: Option<String>,
}

/// What the runtime reported back
#[derive(Debug, Clone, PartialEq)]
pub enum InvocationOutcome {
    Response {
        request_id: String,
        body: Value,
    },
    Error {
        request_id: String,
        error_type: String,
        body: Value,
    },
    InitError {
        error_type: String,
        body: Value,
    },
}

struct RuntimeApiState {
    invocation_rx: Mutex<mpsc::UnboundedReceiver<QueuedInvocation>>,
    outcome_tx: mpsc::UnboundedSender<InvocationOutcome>,
}

/// Fake Runtime API on a random local port
pub struct FakeRuntimeApi {
    server: TestServer,
    invocation_tx: mpsc::UnboundedSender<QueuedInvocation>,
    outcome_rx: Mutex<mpsc::UnboundedReceiver<InvocationOutcome>>,
}

impl FakeRuntimeApi {
    pub async fn start() -> Result<Self, TestError> {
        let (invocation_tx, invocation_rx) = mpsc::unbounded_channel();
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

        let state = Arc::new(RuntimeApiState {
            invocation_rx: Mutex::new(invocation_rx),
            outcome_tx,
        });
        let server = TestServer::start(runtime_api_router(state)).await?;

        Ok(Self {
            server,
            invocation_tx,
            outcome_rx: Mutex::new(outcome_rx),
        })
    }

    /// Value for `AWS_LAMBDA_RUNTIME_API`
    pub fn host(&self) -> String {
        self.server.host()
    }

    /// Queue an event; returns its request id
    pub fn enqueue(&self, event: Value) -> String {
        self.enqueue_raw(Bytes::from(event.to_string()), None)
    }

    /// Queue an event carrying an X-Ray trace header
    pub fn enqueue_traced(&self, event: Value, trace_id: &str) -> String {
        self.enqueue_raw(Bytes::from(event.to_string()), Some(trace_id.to_string()))
    }

    /// Queue a body that is not necessarily valid JSON
    pub fn enqueue_raw(&self, payload: Bytes, trace_id: Option<String>) -> String {
        let request_id = uuid::Uuid::new_v4().to_string();
        let _ = self.invocation_tx.send(QueuedInvocation {
            request_id: request_id.clone(),
            payload,
            trace_id,
        });
        request_id
    }

    /// Wait for the next response, error or init error
    pub async fn next_outcome(&self) -> Result<InvocationOutcome, TestError> {
        let mut rx = self.outcome_rx.lock().await;
        tokio::time::timeout(Duration::from_secs(OUTCOME_TIMEOUT_SECS), rx.recv())
            .await
            .ok()
            .flatten()
            .ok_or(TestError::OutcomeTimeout)
    }
}

fn runtime_api_router(state: Arc<RuntimeApiState>) -> Router {
    Router::new()
        .route(
            "/2018-06-01/runtime/invocation/next",
            get(get_next_invocation),
        )
        .route(
            "/2018-06-01/runtime/invocation/:request_id/response",
            post(post_invocation_response),
        )
        .route(
            "/2018-06-01/runtime/invocation/:request_id/error",
            post(post_invocation_error),
        )
        .route("/2018-06-01/runtime/init/error", post(post_init_error))
        .with_state(state)
}

/// GET /runtime/invocation/next
///
/// Blocks until an invocation is queued.
async fn get_next_invocation(State(state): State<Arc<RuntimeApiState>>) -> Response {
    let invocation = {
        let mut rx = state.invocation_rx.lock().await;
        match rx.recv().await {
            Some(inv) => inv,
            None => {
                return (StatusCode::INTERNAL_SERVER_ERROR, "Invocation channel closed")
                    .into_response();
            }
        }
    };

    debug!(request_id = %invocation.request_id, "Delivering invocation to runtime");

    let deadline_ms = chrono::Utc::now().timestamp_millis() + 30_000;
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header("Lambda-Runtime-Aws-Request-Id", &invocation.request_id)
        .header("Lambda-Runtime-Invoked-Function-Arn", FUNCTION_ARN)
        .header("Lambda-Runtime-Deadline-Ms", deadline_ms.to_string());
    if let Some(trace_id) = &invocation.trace_id {
        builder = builder.header("Lambda-Runtime-Trace-Id", trace_id);
    }

    builder
        .body(Body::from(invocation.payload))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

/// POST /runtime/invocation/{requestId}/response
async fn post_invocation_response(
    State(state): State<Arc<RuntimeApiState>>,
    Path(request_id): Path<String>,
    body: Bytes,
) -> StatusCode {
    let _ = state.outcome_tx.send(InvocationOutcome::Response {
        request_id,
        body: parse_body(&body),
    });
    StatusCode::ACCEPTED
}

/// POST /runtime/invocation/{requestId}/error
async fn post_invocation_error(
    State(state): State<Arc<RuntimeApiState>>,
    Path(request_id): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let _ = state.outcome_tx.send(InvocationOutcome::Error {
        request_id,
        error_type: error_type(&headers, "Runtime.UnhandledError"),
        body: parse_body(&body),
    });
    StatusCode::ACCEPTED
}

/// POST /runtime/init/error
async fn post_init_error(
    State(state): State<Arc<RuntimeApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let _ = state.outcome_tx.send(InvocationOutcome::InitError {
        error_type: error_type(&headers, "Runtime.InitError"),
        body: parse_body(&body),
    });
    StatusCode::ACCEPTED
}

fn error_type(headers: &HeaderMap, default: &str) -> String {
    headers
        .get("Lambda-Runtime-Function-Error-Type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or(default)
        .to_string()
}

fn parse_body(body: &[u8]) -> Value {
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
