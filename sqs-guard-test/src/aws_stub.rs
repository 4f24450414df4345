//! Stub AWS endpoint for SQS and EC2
//!
//! Answers the handful of read-only calls the function makes, using the same
//! wire protocols as AWS: SQS over JSON 1.0 (routed by `X-Amz-Target`) and
//! EC2 over the query protocol (form body, XML response). Point an SDK client
//! at [`StubAws::url`] via `endpoint_url`.

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::Response,
    routing::post,
    Router,
};
use bytes::Bytes;
use dashmap::DashMap;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

use crate::server::{TestError, TestServer};

pub const ACCOUNT_ID: &str = "000000000000";

#[derive(Debug, Default, Clone)]
struct StubQueue {
    url: String,
    attributes: HashMap<String, String>,
    tags: HashMap<String, String>,
}

#[derive(Default)]
struct StubState {
    queues: DashMap<String, StubQueue>,
    vpc_endpoints: Mutex<Vec<(String, String)>>,
    ec2_denied: Mutex<bool>,
    requests: Mutex<Vec<String>>,
}

/// Stub SQS + EC2 endpoint on a random local port
pub struct StubAws {
    server: TestServer,
    state: Arc<StubState>,
}

impl StubAws {
    pub async fn start() -> Result<Self, TestError> {
        let state = Arc::new(StubState::default());
        let router = Router::new()
            .route("/", post(handle_request))
            .with_state(state.clone());
        let server = TestServer::start(router).await?;

        Ok(Self { server, state })
    }

    /// Endpoint URL for SDK clients
    pub fn url(&self) -> String {
        self.server.url()
    }

    /// Create a queue and return its URL
    pub fn create_queue(&self, name: &str) -> String {
        let url = format!("https://sqs.us-east-1.amazonaws.com/{}/{}", ACCOUNT_ID, name);
        self.state.queues.insert(
            name.to_string(),
            StubQueue {
                url: url.clone(),
                attributes: HashMap::from([(
                    "QueueArn".to_string(),
                    format!("arn:aws:sqs:us-east-1:{}:{}", ACCOUNT_ID, name),
                )]),
                tags: HashMap::new(),
            },
        );
        url
    }

    pub fn set_attribute(&self, name: &str, key: &str, value: &str) {
        if let Some(mut queue) = self.state.queues.get_mut(name) {
            queue.attributes.insert(key.to_string(), value.to_string());
        }
    }

    pub fn tag_queue(&self, name: &str, key: &str, value: &str) {
        if let Some(mut queue) = self.state.queues.get_mut(name) {
            queue.tags.insert(key.to_string(), value.to_string());
        }
    }

    pub fn add_vpc_endpoint(&self, id: &str, service_name: &str) {
        self.state
            .vpc_endpoints
            .lock()
            .push((id.to_string(), service_name.to_string()));
    }

    /// Reject every EC2 call with `UnauthorizedOperation`
    pub fn deny_ec2(&self) {
        *self.state.ec2_denied.lock() = true;
    }

    /// Operations received so far, e.g. `AmazonSQS.GetQueueUrl` or
    /// `DescribeVpcEndpoints service-name=com.amazonaws.us-east-1.sqs`
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().clone()
    }
}

async fn handle_request(
    State(state): State<Arc<StubState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    match headers.get("x-amz-target").and_then(|v| v.to_str().ok()) {
        Some(target) => handle_sqs(&state, target, &body),
        None => handle_ec2(&state, &body),
    }
}

// === SQS (JSON 1.0) ===

fn handle_sqs(state: &StubState, target: &str, body: &[u8]) -> Response {
    info!(target = %target, "SQS request");
    state.requests.lock().push(target.to_string());

    let request: Value = serde_json::from_slice(body).unwrap_or(Value::Null);
    let field = |name: &str| request.get(name).and_then(Value::as_str).unwrap_or("");

    match target {
        "AmazonSQS.GetQueueUrl" => match state.queues.get(field("QueueName")) {
            Some(queue) => json_response(json!({ "QueueUrl": queue.url })),
            None => queue_does_not_exist(),
        },
        "AmazonSQS.GetQueueAttributes" => match find_by_url(state, field("QueueUrl")) {
            Some(queue) => json_response(json!({ "Attributes": queue.attributes })),
            None => queue_does_not_exist(),
        },
        "AmazonSQS.ListQueueTags" => match find_by_url(state, field("QueueUrl")) {
            Some(queue) if queue.tags.is_empty() => json_response(json!({})),
            Some(queue) => json_response(json!({ "Tags": queue.tags })),
            None => queue_does_not_exist(),
        },
        _ => {
            warn!(target = %target, "Unknown SQS operation");
            json_error(
                StatusCode::BAD_REQUEST,
                "UnknownOperationException",
                &format!("Unknown operation: {}", target),
            )
        }
    }
}

fn find_by_url(state: &StubState, url: &str) -> Option<StubQueue> {
    let name = url.rsplit('/').next().unwrap_or(url);
    state
        .queues
        .get(name)
        .filter(|q| q.url == url)
        .map(|q| q.value().clone())
}

fn json_response(body: Value) -> Response {
    let mut response = Response::new(Body::from(body.to_string()));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("application/x-amz-json-1.0"),
    );
    response
}

fn json_error(status: StatusCode, code: &str, message: &str) -> Response {
    let mut body = Map::new();
    body.insert("__type".into(), json!(format!("com.amazonaws.sqs#{}", code)));
    body.insert("message".into(), json!(message));

    let mut response = json_response(Value::Object(body));
    *response.status_mut() = status;
    response
}

/// Carries the legacy query error code in `x-amzn-query-error`, as SQS does
fn queue_does_not_exist() -> Response {
    let mut response = json_error(
        StatusCode::BAD_REQUEST,
        "QueueDoesNotExist",
        "The specified queue does not exist.",
    );
    response.headers_mut().insert(
        "x-amzn-query-error",
        header::HeaderValue::from_static("AWS.SimpleQueueService.NonExistentQueue;Sender"),
    );
    response
}

// === EC2 (query) ===

fn handle_ec2(state: &StubState, body: &[u8]) -> Response {
    let params: Vec<(String, String)> = form_urlencoded::parse(body).into_owned().collect();
    let param = |name: &str| {
        params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    };

    let action = param("Action").unwrap_or("");
    info!(action = %action, "EC2 request");

    if action != "DescribeVpcEndpoints" {
        return ec2_error(
            StatusCode::BAD_REQUEST,
            "InvalidAction",
            &format!("The action {} is not valid for this web service.", action),
        );
    }

    let service_names = service_name_filter(&params);
    state.requests.lock().push(format!(
        "DescribeVpcEndpoints service-name={}",
        service_names.join(",")
    ));

    if *state.ec2_denied.lock() {
        return ec2_error(
            StatusCode::FORBIDDEN,
            "UnauthorizedOperation",
            "You are not authorized to perform this operation.",
        );
    }

    let items: String = state
        .vpc_endpoints
        .lock()
        .iter()
        .filter(|(_, service)| service_names.is_empty() || service_names.contains(service))
        .map(|(id, service)| {
            format!(
                "<item><vpcEndpointId>{}</vpcEndpointId><vpcEndpointType>Interface</vpcEndpointType><serviceName>{}</serviceName><state>available</state></item>",
                id, service
            )
        })
        .collect();

    xml_response(
        StatusCode::OK,
        &format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<DescribeVpcEndpointsResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
    <requestId>{}</requestId>
    <vpcEndpointSet>{}</vpcEndpointSet>
</DescribeVpcEndpointsResponse>"#,
            uuid::Uuid::new_v4(),
            items
        ),
    )
}

/// Values of every `Filter.N.Value.M` whose `Filter.N.Name` is `service-name`
fn service_name_filter(params: &[(String, String)]) -> Vec<String> {
    let filters: Vec<&str> = params
        .iter()
        .filter(|(k, v)| k.starts_with("Filter.") && k.ends_with(".Name") && v == "service-name")
        .map(|(k, _)| k.trim_end_matches(".Name"))
        .collect();

    params
        .iter()
        .filter(|(k, _)| {
            filters
                .iter()
                .any(|f| k.starts_with(&format!("{}.Value.", f)))
        })
        .map(|(_, v)| v.clone())
        .collect()
}

fn xml_response(status: StatusCode, body: &str) -> Response {
    let mut response = Response::new(Body::from(body.to_string()));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        header::HeaderValue::from_static("text/xml;charset=UTF-8"),
    );
    response
}

fn ec2_error(status: StatusCode, code: &str, message: &str) -> Response {
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<Response>
    <Errors>
        <Error>
            <Code>{}</Code>
            <Message>{}</Message>
        </Error>
    </Errors>
    <RequestID>{}</RequestID>
</Response>"#,
        code,
        message,
        uuid::Uuid::new_v4()
    );
    xml_response(status, &xml)
}
