//! Holder for the outcome of a single method call.
use std::sync::{Arc, OnceLock};

use serde::de::DeserializeOwned;

use crate::types::{ErrorDetails, Id, JsonValue, ResponsePayload};
use crate::{JsonRpcError, Result};

/// Where a [`ResponseHandle`] is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseState {
    /// The request was queued or sent but no matching response has arrived
    Unpopulated,
    /// The remote endpoint returned a `result`
    Success,
    /// The remote endpoint returned an `error`
    Failure,
}

/// Handle to the response for one request.
///
/// For single calls the handle is returned already populated.  For batches, the handle is
/// returned by [`crate::Batch::push`] before anything is sent, and populated when
/// [`crate::Batch::send`] correlates the batch response.
///
/// A handle is populated at most once and never changes afterwards.  Clones share the same
/// state.
#[derive(Clone, Debug)]
pub struct ResponseHandle {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    id: Id,
    payload: OnceLock<ResponsePayload>,
}

impl ResponseHandle {
    pub(crate) fn new(id: Id) -> Self {
        Self {
            inner: Arc::new(Inner {
                id,
                payload: OnceLock::new(),
            }),
        }
    }

    /// Populate the handle with the response payload.
    ///
    /// Fails if it was already populated; a second response for the same ID is a protocol
    /// violation.
    pub(crate) fn populate(&self, payload: ResponsePayload) -> Result<()> {
        self.inner.payload.set(payload).map_err(|_| {
            JsonRpcError::invalid_response(format!("received more than one response for request {}", self.id()))
        })
    }

    /// The request ID this handle is bound to
    pub fn id(&self) -> &Id {
        &self.inner.id
    }

    pub fn state(&self) -> ResponseState {
        match self.inner.payload.get() {
            None => ResponseState::Unpopulated,
            Some(ResponsePayload::Success(_)) => ResponseState::Success,
            Some(ResponsePayload::Error(_)) => ResponseState::Failure,
        }
    }

    pub fn is_populated(&self) -> bool {
        self.state() != ResponseState::Unpopulated
    }

    pub fn succeeded(&self) -> bool {
        self.state() == ResponseState::Success
    }

    pub fn is_error(&self) -> bool {
        self.state() == ResponseState::Failure
    }

    /// The raw response payload, if a response has arrived
    pub fn payload(&self) -> Option<&ResponsePayload> {
        self.inner.payload.get()
    }

    /// The `result` value of a successful response
    pub fn value(&self) -> Option<&JsonValue> {
        match self.payload()? {
            ResponsePayload::Success(success) => Some(&success.result),
            ResponsePayload::Error(_) => None,
        }
    }

    /// The `error` object of a failed response
    pub fn error(&self) -> Option<&ErrorDetails> {
        match self.payload()? {
            ResponsePayload::Success(_) => None,
            ResponsePayload::Error(error) => Some(&error.error),
        }
    }

    /// Deserialize the successful result into `T`.
    ///
    /// An error response is reported as [`JsonRpcError::Remote`], and a handle with no response
    /// yet as [`JsonRpcError::NotPopulated`].
    pub fn result<T: DeserializeOwned>(&self) -> Result<T> {
        match self.payload() {
            None => Err(JsonRpcError::NotPopulated { id: self.id().clone() }),
            Some(ResponsePayload::Error(error)) => Err(JsonRpcError::Remote {
                error: error.error.clone(),
            }),
            Some(ResponsePayload::Success(success)) => {
                serde_json::from_value(success.result.clone()).map_err(|e| JsonRpcError::DeserResponse {
                    source: e,
                    type_name: std::any::type_name::<T>(),
                    response: success.result.clone(),
                })
            }
        }
    }
}
