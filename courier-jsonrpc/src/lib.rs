//! A client-side implementation of the JSON-RPC 2.0 protocol.
//!
//! The [`Client`] builds request envelopes, posts them to a single endpoint through a
//! [`Transport`], and validates whatever comes back before exposing it.  Requests can be sent one
//! at a time with [`Client::call`], or accumulated in a [`Batch`] and sent as one JSON array, in
//! which case the responses are matched back to their requests by ID.
//!
//! This crate knows nothing about HTTP.  The `courier-http` crate provides a [`Transport`] on top
//! of `reqwest`; anything else that can POST a string and return the reply will do.

mod batch;
mod client;
mod envelope;
mod error;
mod handle;
mod id;
#[cfg(test)]
pub mod testing;
mod transport;
mod types;
mod validate;

pub use batch::Batch;
pub use client::{Client, ClientBuilder, ClientConfig};
pub use envelope::EnvelopeBuilder;
pub use error::{JsonRpcError, Result};
pub use handle::{ResponseHandle, ResponseState};
pub use id::{IdGenerator, IdStrategy};
pub use transport::{JSON_CONTENT_TYPE, PostRequest, Transport};
pub use types::{
    ErrorCode, ErrorDetails, ErrorResponse, Id, JsonValue, Request, Response, ResponsePayload, SuccessResponse,
    TwoPointZero,
};
pub use validate::{ResponseViolation, check_response, validate_response};
