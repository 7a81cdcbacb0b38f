//! Construction of outgoing request envelopes.
use crate::types::{Id, JsonValue, Request};
use crate::{JsonRpcError, Result};

/// Builds [`Request`] objects for a client, applying the client's method namespace if it has one.
///
/// The namespace is prepended to every method name verbatim.  If the remote service expects a
/// delimiter between the namespace and the method (`"math."`, `"math/"`) it must be part of the
/// namespace string.
#[derive(Clone, Debug, Default)]
pub struct EnvelopeBuilder {
    namespace: Option<String>,
}

impl EnvelopeBuilder {
    pub fn new(namespace: impl Into<Option<String>>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Build a request for `method` with the given ID and parameters.
    ///
    /// Fails if the method name is empty, the ID is null or an empty string, or the parameters are
    /// something other than an array or an object.
    pub fn build(&self, id: Id, method: &str, params: Option<JsonValue>) -> Result<Request> {
        if method.is_empty() {
            return Err(JsonRpcError::EmptyMethodName);
        }

        if id.is_empty() {
            return Err(JsonRpcError::EmptyRequestId);
        }

        if let Some(params) = &params {
            if !params.is_array() && !params.is_object() {
                return Err(JsonRpcError::InvalidParams {
                    method: method.to_string(),
                    params: params.clone(),
                });
            }
        }

        let method = match &self.namespace {
            Some(namespace) => format!("{namespace}{method}"),
            None => method.to_string(),
        };

        Ok(Request::new(id, method, params))
    }
}
