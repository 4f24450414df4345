//! Test server management

use axum::Router;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tracing::info;

/// An axum router served on a random local port
pub struct TestServer {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Bind `127.0.0.1:0` and serve `router` in the background
    pub async fn start(router: Router) -> Result<Self, TestError> {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .map_err(|e| TestError::StartFailed(e.to_string()))?;
        let addr = listener
            .local_addr()
            .map_err(|e| TestError::StartFailed(e.to_string()))?;

        info!(port = addr.port(), "Starting test server");

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { addr, handle })
    }

    /// Base URL, e.g. `http://127.0.0.1:41234`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// `host:port`, the form `AWS_LAMBDA_RUNTIME_API` takes
    pub fn host(&self) -> String {
        self.addr.to_string()
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Errors that can occur with test server
#[derive(Debug)]
pub enum TestError {
    StartFailed(String),
    OutcomeTimeout,
}

impl std::fmt::Display for TestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TestError::StartFailed(msg) => write!(f, "Failed to start server: {}", msg),
            TestError::OutcomeTimeout => write!(f, "Timed out waiting for invocation outcome"),
        }
    }
}

impl std::error::Error for TestError {}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[tokio::test]
    async fn test_serves_router() {
        let router = Router::new().route("/health", get(|| async { "ok" }));
        let server = TestServer::start(router).await.unwrap();

        let body = reqwest::get(format!("{}/health", server.url()))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "ok");
        assert_eq!(server.host(), format!("127.0.0.1:{}", server.port()));
    }
}
