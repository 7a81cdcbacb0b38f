//! Batches of requests sent together in a single round trip.
use std::collections::HashMap;

use itertools::Itertools;
use tracing::instrument;

use crate::client::{Client, decode_body};
use crate::handle::ResponseHandle;
use crate::types::{self, Id, JsonValue, ResponsePayload};
use crate::{JsonRpcError, Result, validate};

/// A batch of JSON-RPC requests that will be sent to the endpoint as one JSON array.
///
/// Requests are added with [`Batch::push`], which immediately returns an unpopulated
/// [`ResponseHandle`].  Nothing goes over the wire until [`Batch::send`], which posts every
/// pending request at once and populates the handles from the array of responses, matching
/// responses to requests by ID.  The order of the responses in the array doesn't matter.
///
/// A batch is an owned value and both `push` and `send` take `&mut self`, so one batch can't be
/// filled from several tasks at once.  After `send` completes, successfully or not, the batch is
/// empty and can be reused.
pub struct Batch {
    client: Client,
    pending: Vec<(types::Request, ResponseHandle)>,
}

impl Batch {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            pending: Vec::new(),
        }
    }

    /// Number of requests waiting to be sent
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// IDs of the requests waiting to be sent, in the order they were pushed
    pub fn pending_ids(&self) -> impl Iterator<Item = &Id> {
        self.pending.iter().map(|(request, _)| &request.id)
    }

    /// Add a request to the batch.
    ///
    /// If `id` is `None`, null or empty, an ID is generated.  A caller-supplied ID must not
    /// already be pending in this batch.
    ///
    /// The returned handle stays unpopulated until the batch is sent and a response with the
    /// request's ID comes back.
    pub fn push(
        &mut self,
        method: &str,
        params: impl Into<Option<JsonValue>>,
        id: impl Into<Option<Id>>,
    ) -> Result<ResponseHandle> {
        let id = match id.into() {
            Some(id) if !id.is_empty() => {
                if self.is_pending(&id) {
                    return Err(JsonRpcError::DuplicateRequestId { id });
                }
                id
            }
            _ => self.generate_id(),
        };

        let request = self.client.envelope().build(id, method, params.into())?;
        let handle = ResponseHandle::new(request.id.clone());

        tracing::trace!(request_id = %request.id, method = %request.method, "Request added to batch");
        self.pending.push((request, handle.clone()));

        Ok(handle)
    }

    /// Send every pending request to the endpoint and correlate the responses.
    ///
    /// The pending requests are taken out of the batch before anything is sent, so whatever the
    /// outcome the batch is empty afterwards.  If the send fails, none of the handles from this
    /// batch are populated.
    ///
    /// Every element of the response array must be a valid response object whose ID matches
    /// exactly one pending request; anything else fails the whole batch with
    /// [`JsonRpcError::InvalidResponse`].  Requests that got no response at all stay
    /// unpopulated.
    #[instrument(skip_all, fields(batch_len = self.pending.len()))]
    pub async fn send(&mut self) -> Result<()> {
        let pending = std::mem::take(&mut self.pending);

        if pending.is_empty() {
            tracing::debug!("Batch is empty; nothing to send");
            return Ok(());
        }

        let (requests, handles): (Vec<_>, Vec<_>) = pending.into_iter().unzip();

        let body = serde_json::to_string(&requests).map_err(|e| JsonRpcError::SerRequest {
            source: e,
            type_name: std::any::type_name::<Vec<types::Request>>(),
        })?;

        tracing::debug!("Sending batch");
        let decoded = decode_body(self.client.post(body).await?)?;

        let responses = match decoded {
            JsonValue::Array(responses) => responses,
            other => return Err(non_array_response(other)),
        };

        correlate(handles, responses)
    }

    fn is_pending(&self, id: &Id) -> bool {
        self.pending_ids().any(|pending| pending == id)
    }

    /// Generate an ID that isn't already used by a caller-supplied ID in this batch.
    fn generate_id(&self) -> Id {
        loop {
            let id = self.client.next_id();
            if !self.is_pending(&id) {
                return id;
            }
        }
    }
}

/// Match every response to its pending request, then populate the handles.
///
/// Nothing is populated until every response has been validated and matched, so an invalid batch
/// response leaves all of the handles untouched.
fn correlate(handles: Vec<ResponseHandle>, responses: Vec<JsonValue>) -> Result<()> {
    let mut unanswered: HashMap<Id, ResponseHandle> = handles
        .into_iter()
        .map(|handle| (handle.id().clone(), handle))
        .collect();
    let mut matched: Vec<(ResponseHandle, ResponsePayload)> = Vec::with_capacity(responses.len());

    for decoded in responses {
        let response = validate::parse_response(decoded)?;

        match unanswered.remove(&response.id) {
            Some(handle) => matched.push((handle, response.payload)),
            None if matched.iter().any(|(handle, _)| handle.id() == &response.id) => {
                return Err(JsonRpcError::invalid_response(format!(
                    "batch response contains more than one response for request {}",
                    response.id
                )));
            }
            None => {
                return Err(JsonRpcError::invalid_response(format!(
                    "batch response contains ID {} which matches no pending request",
                    response.id
                )));
            }
        }
    }

    if !unanswered.is_empty() {
        tracing::warn!(
            unanswered = %unanswered.keys().sorted().join(", "),
            "Batch response did not include a response for every request"
        );
    }

    tracing::debug!(responses = matched.len(), "Correlated batch response");
    for (handle, payload) in matched {
        handle.populate(payload)?;
    }

    Ok(())
}

/// Build the error for a batch response body that isn't an array.
///
/// When the endpoint rejects a batch as a whole it answers with a single error object rather than
/// an array.  That is reported as the remote error it is; anything else is an invalid response.
fn non_array_response(decoded: JsonValue) -> JsonRpcError {
    if let Ok(response) = validate::parse_response(decoded.clone()) {
        if let ResponsePayload::Error(error) = response.payload {
            return JsonRpcError::Remote { error: error.error };
        }
    }

    tracing::debug!(response_id = ?validate::response_id(&decoded), "Batch response is not an array");
    JsonRpcError::invalid_response("batch response is not an array")
}
