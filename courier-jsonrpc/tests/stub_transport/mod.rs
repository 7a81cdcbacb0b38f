//! Stub transports that never touch the network.  They answer each post with a body computed from
//! the request and record everything that was posted so tests can inspect the wire traffic.
#![allow(dead_code)]

use std::borrow::Cow;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use courier_jsonrpc::{JsonValue, PostRequest, Transport};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
#[error("stub transport failure: {0}")]
pub struct StubError(pub String);

type Responder = dyn Fn(&PostRequest) -> Result<Option<String>, StubError> + Send + Sync;

pub struct StubTransport {
    responder: Box<Responder>,
    posted: Mutex<Vec<PostRequest>>,
}

impl StubTransport {
    pub fn new(
        responder: impl Fn(&PostRequest) -> Result<Option<String>, StubError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            responder: Box::new(responder),
            posted: Mutex::new(Vec::new()),
        })
    }

    /// Always answer with the same body
    pub fn replying(body: impl Into<Option<String>>) -> Arc<Self> {
        let body = body.into();
        Self::new(move |_| Ok(body.clone()))
    }

    /// Answer with each of these bodies in turn, one per post
    pub fn replying_in_order(bodies: Vec<Option<String>>) -> Arc<Self> {
        let bodies = Mutex::new(VecDeque::from(bodies));
        Self::new(move |_| {
            bodies
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| StubError("no more canned replies".to_string()))
        })
    }

    /// Always fail at the transport level
    pub fn failing(message: &str) -> Arc<Self> {
        let message = message.to_string();
        Self::new(move |_| Err(StubError(message.clone())))
    }

    /// Behave like a well-behaved server whose every method returns its params.
    ///
    /// Batches are answered in reverse order, which is legal and shakes out any code that
    /// correlates by position.
    pub fn echo() -> Arc<Self> {
        Self::new(|request| {
            let payload: JsonValue = serde_json::from_str(&request.body).unwrap();
            let reply = match payload {
                JsonValue::Array(requests) => {
                    JsonValue::Array(requests.iter().rev().map(echo_response).collect())
                }
                request => echo_response(&request),
            };
            Ok(Some(reply.to_string()))
        })
    }

    /// Every payload posted so far
    pub fn posted(&self) -> Vec<PostRequest> {
        self.posted.lock().unwrap().clone()
    }

    /// The most recent payload, parsed as JSON
    pub fn last_payload(&self) -> JsonValue {
        let posted = self.posted.lock().unwrap();
        let last = posted.last().expect("nothing was posted");
        serde_json::from_str(&last.body).unwrap()
    }
}

fn echo_response(request: &JsonValue) -> JsonValue {
    json!({
        "jsonrpc": "2.0",
        "result": request.get("params").cloned().unwrap_or(JsonValue::Null),
        "id": request["id"].clone(),
    })
}

impl Transport for StubTransport {
    type Error = StubError;

    fn describe(&self) -> Cow<'static, str> {
        Cow::Borrowed("stub")
    }

    fn post(&self, request: PostRequest) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_ {
        let reply = (self.responder)(&request);
        self.posted.lock().unwrap().push(request);
        std::future::ready(reply)
    }
}
