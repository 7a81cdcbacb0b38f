use serde_json::Value as JsonValue;
use thiserror::Error;

use crate::types::{ErrorDetails, Id};

pub type Result<T, E = JsonRpcError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum JsonRpcError {
    #[error("Endpoint URL '{url}' is not a valid URL")]
    InvalidUrl { source: url::ParseError, url: String },

    #[error("Method name must not be empty")]
    EmptyMethodName,

    #[error("Request ID must not be null or an empty string")]
    EmptyRequestId,

    #[error("Parameters for method '{method}' must be a JSON array or object, got: {params}")]
    InvalidParams { method: String, params: JsonValue },

    #[error("Request ID {id} is already pending in this batch")]
    DuplicateRequestId { id: Id },

    #[error("Error serializing request {type_name} to JSON")]
    SerRequest {
        source: serde_json::Error,
        type_name: &'static str,
    },

    #[error("Response body is not valid JSON")]
    InvalidJson { source: serde_json::Error, body: String },

    #[error("Invalid JSON-RPC response: {reason}")]
    InvalidResponse { reason: String },

    #[error("Remote endpoint returned error {code}: {message}", code = .error.code.code(), message = .error.message)]
    Remote { error: ErrorDetails },

    #[error("Response to request {id} has not been received")]
    NotPopulated { id: Id },

    #[error("Error deserializing response to {type_name}")]
    DeserResponse {
        source: serde_json::Error,
        type_name: &'static str,
        response: JsonValue,
    },

    #[error("Transport error")]
    Transport {
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl JsonRpcError {
    pub(crate) fn invalid_response(reason: impl Into<String>) -> Self {
        Self::InvalidResponse { reason: reason.into() }
    }

    /// If this error is a structured error reported by the remote endpoint, get the details
    pub fn remote_error(&self) -> Option<&ErrorDetails> {
        match self {
            Self::Remote { error } => Some(error),
            _ => None,
        }
    }
}
