use std::borrow::Cow;
use std::future::Future;
use std::time::Duration;

use courier_jsonrpc::{self as jsonrpc, PostRequest};
use serde::Deserialize;

use crate::{HttpTransportError, Result};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for the underlying HTTP client.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct HttpTransportConfig {
    /// Timeout for the whole request, from connecting until the response body has been read.
    ///
    /// `None` means no timeout at all, which is rarely what you want.
    #[serde(with = "humantime_serde")]
    pub timeout: Option<Duration>,

    /// Value of the `User-Agent` header
    pub user_agent: Option<String>,
}

impl Default for HttpTransportConfig {
    fn default() -> Self {
        Self {
            timeout: Some(DEFAULT_TIMEOUT),
            user_agent: Some(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()),
        }
    }
}

/// [`jsonrpc::Transport`] implementation that POSTs each payload over HTTP(S) using `reqwest`.
///
/// Connections are pooled by the underlying `reqwest` client, so one transport should be reused
/// for all calls to an endpoint.
#[derive(Clone, Debug)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: HttpTransportConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(user_agent) = config.user_agent {
            builder = builder.user_agent(user_agent);
        }

        let client = builder
            .build()
            .map_err(|e| HttpTransportError::BuildClient { source: e })?;

        Ok(Self { client })
    }

    /// Use an existing `reqwest` client, with whatever configuration it already has
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    async fn post_inner(&self, request: PostRequest) -> Result<Option<String>> {
        let url = request.url.to_string();

        let mut builder = self.client.post(request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        tracing::debug!(%url, bytes = request.body.len(), "Sending HTTP POST");
        let response = builder
            .body(request.body)
            .send()
            .await
            .map_err(|e| HttpTransportError::Request {
                source: e,
                url: url.clone(),
            })?;

        let status = response.status();
        if !status.is_success() {
            // The body may still hold a JSON-RPC error object, so it's up to the client to judge it
            tracing::debug!(%url, %status, "HTTP POST returned a non-success status");
        }

        let body = response
            .text()
            .await
            .map_err(|e| HttpTransportError::ReadBody { source: e, url, status })?;

        Ok((!body.is_empty()).then_some(body))
    }
}

impl jsonrpc::Transport for HttpTransport {
    type Error = HttpTransportError;

    fn describe(&self) -> Cow<'static, str> {
        Cow::Borrowed("http")
    }

    fn post(&self, request: PostRequest) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_ {
        self.post_inner(request)
    }
}

/// Build a JSON-RPC client that talks to the endpoint in `config` over HTTP.
pub fn connect(config: jsonrpc::ClientConfig, http_config: HttpTransportConfig) -> Result<jsonrpc::Client> {
    let builder = jsonrpc::Client::builder()
        .with_config(config)
        .map_err(|e| HttpTransportError::JsonRpcBind { source: e })?;

    Ok(builder.bind(HttpTransport::new(http_config)?))
}
