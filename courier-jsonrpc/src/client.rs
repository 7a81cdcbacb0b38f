use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::batch::Batch;
use crate::envelope::EnvelopeBuilder;
use crate::handle::ResponseHandle;
use crate::id::{IdGenerator, IdStrategy};
use crate::transport::{self, BoxedTransport, PostRequest};
use crate::types::{Id, JsonValue};
use crate::{JsonRpcError, Result, validate};

/// Everything needed to construct a [`Client`] apart from the transport.
///
/// Deserializable so that it can be loaded from the application's own config file.
#[derive(Clone, Debug, Deserialize)]
pub struct ClientConfig {
    /// Endpoint URL that every request is posted to
    pub url: String,

    /// Extra headers sent with every request.  Any `Content-Type` given here is replaced with
    /// `application/json`.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,

    /// Prefix prepended to every method name
    #[serde(default)]
    pub namespace: Option<String>,

    /// How request IDs are generated when the caller doesn't supply one
    #[serde(default)]
    pub id_strategy: IdStrategy,
}

impl ClientConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            headers: BTreeMap::new(),
            namespace: None,
            id_strategy: IdStrategy::default(),
        }
    }
}

#[derive(Debug)]
pub struct ClientBuilder<Stage> {
    stage: Stage,
}

impl Default for ClientBuilder<Stage1> {
    fn default() -> Self {
        Self { stage: Stage1 }
    }
}

impl ClientBuilder<Stage1> {
    /// Set the endpoint URL.
    ///
    /// The URL is parsed right away, so a malformed URL fails here before any network activity.
    pub fn with_url(self, url: &str) -> Result<ClientBuilder<Stage2>> {
        self.with_config(ClientConfig::new(url))
    }

    /// Start from a complete [`ClientConfig`], validating the URL it contains.
    pub fn with_config(self, config: ClientConfig) -> Result<ClientBuilder<Stage2>> {
        let url = Url::parse(&config.url).map_err(|e| JsonRpcError::InvalidUrl {
            source: e,
            url: config.url.clone(),
        })?;

        Ok(ClientBuilder {
            stage: Stage2 {
                url,
                headers: config.headers.into_iter().collect(),
                namespace: config.namespace,
                id_strategy: config.id_strategy,
            },
        })
    }
}

impl ClientBuilder<Stage2> {
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.stage.namespace = Some(namespace.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.stage.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_id_strategy(mut self, id_strategy: IdStrategy) -> Self {
        self.stage.id_strategy = id_strategy;
        self
    }

    pub fn bind(self, transport: impl transport::Transport) -> Client {
        let Stage2 {
            url,
            headers,
            namespace,
            id_strategy,
        } = self.stage;

        // Whatever content type the caller asked for, the payload is always JSON
        let mut headers = headers
            .into_iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("content-type"))
            .collect::<Vec<_>>();
        headers.push(("Content-Type".to_string(), transport::JSON_CONTENT_TYPE.to_string()));

        tracing::debug!(%url, transport = %transport.describe(), "Binding JSON-RPC client");

        Client {
            inner: Arc::new(ClientInner {
                url,
                headers,
                envelope: EnvelopeBuilder::new(namespace),
                ids: IdGenerator::new(id_strategy),
                transport: Box::new(transport),
            }),
        }
    }
}

#[doc(hidden)]
#[derive(Debug)]
pub struct Stage1;

#[doc(hidden)]
#[derive(Debug)]
pub struct Stage2 {
    url: Url,
    headers: Vec<(String, String)>,
    namespace: Option<String>,
    id_strategy: IdStrategy,
}

/// JSON-RPC 2.0 client for a single endpoint.
///
/// Cheap to clone; clones share the transport and the ID generator, so IDs stay unique across all
/// of them.
///
/// Every method name is a potential remote call: [`Self::invoke`] takes the method name as data,
/// and [`Self::call_method`] layers typed parameters and results on top of it.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.inner.url.as_str())
            .field("namespace", &self.namespace())
            .field("id_strategy", &self.inner.ids.strategy())
            .field("transport", &self.inner.transport.boxed_describe())
            .finish()
    }
}

struct ClientInner {
    url: Url,
    headers: Vec<(String, String)>,
    envelope: EnvelopeBuilder,
    ids: IdGenerator,
    transport: Box<dyn BoxedTransport>,
}

impl Client {
    pub fn builder() -> ClientBuilder<Stage1> {
        ClientBuilder::default()
    }

    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    pub fn namespace(&self) -> Option<&str> {
        self.inner.envelope.namespace()
    }

    /// Headers sent with every request, including the forced `Content-Type`
    pub fn headers(&self) -> &[(String, String)] {
        &self.inner.headers
    }

    /// Generate a fresh request ID from this client's generator
    pub fn next_id(&self) -> Id {
        self.inner.ids.next_id()
    }

    pub(crate) fn envelope(&self) -> &EnvelopeBuilder {
        &self.inner.envelope
    }

    /// Invoke `method` with a generated request ID.
    pub async fn invoke(&self, method: &str, params: impl Into<Option<JsonValue>>) -> Result<ResponseHandle> {
        self.call(self.next_id(), method, params).await
    }

    /// Invoke `method` with typed parameters, and deserialize the result into `Resp`.
    ///
    /// Parameters must serialize to a JSON array or object; `()` means no parameters.  An error
    /// response from the endpoint is returned as [`JsonRpcError::Remote`].
    pub async fn call_method<Req, Resp>(&self, method: &str, params: Req) -> Result<Resp>
    where
        Req: Serialize,
        Resp: DeserializeOwned,
    {
        let params = serde_json::to_value(params).map_err(|e| JsonRpcError::SerRequest {
            source: e,
            type_name: std::any::type_name::<Req>(),
        })?;
        let params = (!params.is_null()).then_some(params);

        self.invoke(method, params).await?.result()
    }

    /// Send one request and wait for its response.
    ///
    /// If `id` is null or empty a generated ID is used instead.  The returned handle is already
    /// populated, and is bound to the ID the endpoint put in its response.
    #[instrument(skip_all, fields(method, request_id))]
    pub async fn call(
        &self,
        id: impl Into<Id>,
        method: &str,
        params: impl Into<Option<JsonValue>>,
    ) -> Result<ResponseHandle> {
        let mut id = id.into();
        if id.is_empty() {
            id = self.next_id();
        }

        let span = tracing::Span::current();
        span.record("method", method);
        span.record("request_id", tracing::field::display(&id));

        let request = self.inner.envelope.build(id, method, params.into())?;
        let body = serde_json::to_string(&request).map_err(|e| JsonRpcError::SerRequest {
            source: e,
            type_name: std::any::type_name::<crate::types::Request>(),
        })?;

        let decoded = decode_body(self.post(body).await?)?;
        let response = validate::parse_response(decoded)?;

        if response.id != request.id {
            tracing::warn!(response_id = %response.id,
                "Response ID does not match the request ID");
        }

        let handle = ResponseHandle::new(response.id);
        handle.populate(response.payload)?;

        tracing::debug!(state = ?handle.state(), "Call completed");
        Ok(handle)
    }

    /// Start a new, empty batch of requests that will be sent through this client.
    pub fn start_batch(&self) -> Batch {
        Batch::new(self.clone())
    }

    /// POST a serialized payload to the endpoint and return the response body, which is
    /// guaranteed to be non-empty.
    pub(crate) async fn post(&self, body: String) -> Result<String> {
        tracing::trace!(%body, "Posting request payload");

        let request = PostRequest {
            url: self.inner.url.clone(),
            headers: self.inner.headers.clone(),
            body,
        };

        match self.inner.transport.boxed_post(request).await? {
            Some(body) if !body.is_empty() => {
                tracing::trace!(%body, "Received response payload");
                Ok(body)
            }
            _ => Err(JsonRpcError::invalid_response("response body is empty")),
        }
    }
}

/// Decode a response body as JSON, keeping the raw body around if that fails.
pub(crate) fn decode_body(body: String) -> Result<JsonValue> {
    serde_json::from_str(&body).map_err(|e| JsonRpcError::InvalidJson { source: e, body })
}
