//! Lambda Runtime API client
//!
//! Speaks the `2018-06-01` Runtime API a custom runtime uses to receive
//! invocations and send responses. A failing invocation is reported and the
//! loop continues; only failures talking to the Runtime API itself end it.

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info_span, Instrument};

use crate::handler::Handler;
use crate::invocation::{Invocation, InvocationContext, LambdaErrorResponse};

pub const RUNTIME_API_VERSION: &str = "2018-06-01";

const REQUEST_ID_HEADER: &str = "Lambda-Runtime-Aws-Request-Id";
const DEADLINE_HEADER: &str = "Lambda-Runtime-Deadline-Ms";
const FUNCTION_ARN_HEADER: &str = "Lambda-Runtime-Invoked-Function-Arn";
const TRACE_ID_HEADER: &str = "Lambda-Runtime-Trace-Id";
const ERROR_TYPE_HEADER: &str = "Lambda-Runtime-Function-Error-Type";

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("AWS_LAMBDA_RUNTIME_API is not set")]
    MissingRuntimeApi,

    #[error("Runtime API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Missing {0} header on next invocation")]
    MissingHeader(&'static str),
}

/// Client for one Runtime API endpoint
pub struct Runtime {
    client: Client,
    base_url: String,
}

impl Runtime {
    /// `api` is the `host:port` from `AWS_LAMBDA_RUNTIME_API`
    pub fn new(api: &str) -> Result<Self, RuntimeError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: format!("http://{}/{}/runtime", api, RUNTIME_API_VERSION),
        })
    }

    pub fn from_env() -> Result<Self, RuntimeError> {
        let api = std::env::var("AWS_LAMBDA_RUNTIME_API")
            .map_err(|_| RuntimeError::MissingRuntimeApi)?;
        Self::new(&api)
    }

    /// Block until the next invocation is available
    pub async fn next_invocation(&self) -> Result<Invocation, RuntimeError> {
        let response = self
            .client
            .get(format!("{}/invocation/next", self.base_url))
            .send()
            .await?
            .error_for_status()?;

        let context = context_from_headers(response.headers())?;
        let payload = response.bytes().await?;

        Ok(Invocation { context, payload })
    }

    pub async fn send_response(&self, request_id: &str, body: &Value) -> Result<(), RuntimeError> {
        self.client
            .post(format!("{}/invocation/{}/response", self.base_url, request_id))
            .json(body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    pub async fn send_error(
        &self,
        request_id: &str,
        error: &LambdaErrorResponse,
    ) -> Result<(), RuntimeError> {
        self.client
            .post(format!("{}/invocation/{}/error", self.base_url, request_id))
            .header(ERROR_TYPE_HEADER, &error.error_type)
            .json(error)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Report a failure that happened before the first invocation
    pub async fn send_init_error(&self, error: &LambdaErrorResponse) -> Result<(), RuntimeError> {
        self.client
            .post(format!("{}/init/error", self.base_url))
            .header(ERROR_TYPE_HEADER, &error.error_type)
            .json(error)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Fetch, handle and report a single invocation
    pub async fn run_once<H: Handler + ?Sized>(&self, handler: &H) -> Result<(), RuntimeError> {
        let Invocation { context, payload } = self.next_invocation().await?;
        let span = info_span!("invocation", request_id = %context.request_id);

        async {
            // Races with env reads on other worker threads (SDK credential
            // providers). Nothing else in the process writes the environment.
            if let Some(trace_id) = &context.trace_id {
                std::env::set_var("_X_AMZN_TRACE_ID", trace_id);
            }

            let request_id = context.request_id.clone();
            match dispatch(handler, payload, context).await {
                Ok(body) => {
                    debug!("Invocation succeeded");
                    self.send_response(&request_id, &body).await
                }
                Err(err) => {
                    error!(error_type = %err.error_type, "{}", err.error_message);
                    self.send_error(&request_id, &err).await
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Serve invocations until the Runtime API becomes unreachable
    pub async fn run<H: Handler + ?Sized>(&self, handler: &H) -> Result<(), RuntimeError> {
        loop {
            self.run_once(handler).await?;
        }
    }
}

async fn dispatch<H: Handler + ?Sized>(
    handler: &H,
    payload: Bytes,
    context: InvocationContext,
) -> Result<Value, LambdaErrorResponse> {
    let event: Value = serde_json::from_slice(&payload)
        .map_err(|e| LambdaErrorResponse::new("Runtime.InvalidEvent", e.to_string()))?;
    handler.call(event, context).await
}

fn context_from_headers(headers: &HeaderMap) -> Result<InvocationContext, RuntimeError> {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let request_id = header(REQUEST_ID_HEADER)
        .ok_or(RuntimeError::MissingHeader(REQUEST_ID_HEADER))?
        .to_string();

    Ok(InvocationContext {
        request_id,
        invoked_function_arn: header(FUNCTION_ARN_HEADER).unwrap_or_default().to_string(),
        deadline_ms: header(DEADLINE_HEADER)
            .and_then(|v| v.parse().ok())
            .unwrap_or_default(),
        trace_id: header(TRACE_ID_HEADER).map(str::to_string),
    })
}
