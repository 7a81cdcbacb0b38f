//! Helpers for testing the HTTP transport.
//!
//! This module is only compiled when `test` is enabled

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderName, StatusCode, header};
use axum::routing::post;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Initialize tracing with a subscriber and some reasonable defaults suitable for enabling log
/// output in tests.
///
/// This is idempotent; it can be called from multiple tests in multiple threads but will only
/// initialize tracing once.
pub fn init_test_logging() {
    use std::sync::OnceLock;

    const DEFAULT_LOG_FILTER: &str = "courier_http=trace,courier_jsonrpc=trace,info";
    static INIT_LOGGING: OnceLock<()> = OnceLock::new();

    INIT_LOGGING.get_or_init(|| {
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
            .with_test_writer()
            .try_init()
            .unwrap()
    });
}

/// A request received by a [`CannedEndpoint`]
#[derive(Clone, Debug)]
pub struct CapturedRequest {
    pub headers: HeaderMap,
    pub body: String,
}

#[derive(Clone)]
struct EndpointState {
    status: StatusCode,
    body: &'static str,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

/// A local HTTP endpoint that answers every `POST /rpc` with the same canned status and body,
/// and records what it was sent.
///
/// The server task is aborted when this is dropped.
pub struct CannedEndpoint {
    url: String,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
    server: JoinHandle<()>,
}

impl CannedEndpoint {
    pub async fn start(status: StatusCode, body: &'static str) -> Self {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let app = Router::new().route("/rpc", post(capture)).with_state(EndpointState {
            status,
            body,
            requests: requests.clone(),
        });

        Self::serve(app, requests).await
    }

    /// Serve an arbitrary router, for tests that need the endpoint to misbehave
    pub async fn serve(app: Router, requests: Arc<Mutex<Vec<CapturedRequest>>>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/rpc", listener.local_addr().unwrap());

        let server = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { url, requests, server }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// The one request this endpoint received, failing the test if there were more or fewer
    pub fn only_request(&self) -> CapturedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1, "{requests:?}");
        requests.into_iter().next().unwrap()
    }
}

impl Drop for CannedEndpoint {
    fn drop(&mut self) {
        self.server.abort();
    }
}

async fn capture(
    State(state): State<EndpointState>,
    headers: HeaderMap,
    body: String,
) -> (StatusCode, [(HeaderName, &'static str); 1], &'static str) {
    state.requests.lock().unwrap().push(CapturedRequest { headers, body });

    (state.status, [(header::CONTENT_TYPE, "application/json")], state.body)
}
