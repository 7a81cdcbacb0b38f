//! In this crate, the concept of a "transport" abstracts away the details of how serialized
//! JSON-RPC payloads get to the endpoint and how the reply comes back.
//!
//! The client only ever does one thing with a transport: POST a body to the endpoint URL and wait
//! for the response body.  Connection handling, TLS, timeouts and any transport-level retries are
//! entirely the transport's business.  The HTTP implementation lives in the `courier-http` crate;
//! tests use stub transports that answer with canned bodies.
use std::borrow::Cow;
use std::future::Future;
use std::sync::Arc;

use futures::{FutureExt, TryFutureExt, future::BoxFuture};
use url::Url;

use crate::{JsonRpcError, Result};

/// Content type the client forces on every request
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// One outgoing POST: the endpoint, the headers to send, and the serialized JSON-RPC payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PostRequest {
    pub url: Url,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl PostRequest {
    /// Look up a header value by name, ignoring case
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(header, _)| header.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A transport sends a serialized request payload to the endpoint and returns whatever body came
/// back.
///
/// Returning `Ok(None)` means the transport succeeded but there was no body.  The client treats
/// that, and an empty body, as an invalid response; a transport should not try to interpret the
/// body itself.
pub trait Transport: Send + Sync + 'static {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Transport-specific description of the endpoint, useful for logging and debugging.
    fn describe(&self) -> Cow<'static, str>;

    /// POST the request and wait for the response body.
    ///
    /// The framework does not implement any timeout of its own since timeouts are
    /// transport-dependent.
    fn post(&self, request: PostRequest) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;
}

impl<T: Transport> Transport for Arc<T> {
    type Error = T::Error;

    fn describe(&self) -> Cow<'static, str> {
        (**self).describe()
    }

    fn post(&self, request: PostRequest) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_ {
        (**self).post(request)
    }
}

/// Internal dyn-compatible wrapper trait around [`Transport`] to erase the types and allow dynamic
/// dispatch, so that [`crate::Client`] doesn't need a type parameter for its transport.
pub(crate) trait BoxedTransport: Send + Sync + 'static {
    fn boxed_describe(&self) -> Cow<'static, str>;
    fn boxed_post(&self, request: PostRequest) -> BoxFuture<'_, Result<Option<String>>>;
}

impl<T> BoxedTransport for T
where
    T: Transport,
{
    fn boxed_describe(&self) -> Cow<'static, str> {
        <Self as Transport>::describe(self)
    }

    fn boxed_post(&self, request: PostRequest) -> BoxFuture<'_, Result<Option<String>>> {
        <Self as Transport>::post(self, request)
            .map_err(|e| JsonRpcError::Transport { source: Box::new(e) })
            .boxed()
    }
}
