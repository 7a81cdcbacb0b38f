//! Structural validation of decoded response objects.
//!
//! Responses are checked as raw [`JsonValue`]s, before any attempt to deserialize them, so that a
//! malformed response is reported as a protocol violation rather than as some confusing serde
//! error.
use thiserror::Error;

use crate::types::{Id, JsonValue, Response};
use crate::{JsonRpcError, Result};

const JSONRPC_VERSION: &str = "2.0";

/// The first rule a response object broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ResponseViolation {
    #[error("response is not a JSON object")]
    NotAnObject,
    #[error("`jsonrpc` member is missing or not \"2.0\"")]
    WrongVersion,
    #[error("`id` member is missing")]
    MissingId,
    #[error("response has both `result` and `error`")]
    ResultAndError,
    #[error("response has neither `result` nor `error`")]
    NeitherResultNorError,
    #[error("`error` member is not an object")]
    ErrorNotAnObject,
    #[error("`error.code` is missing or not an integer")]
    ErrorCodeNotInteger,
    #[error("`error.message` is missing or not a string")]
    ErrorMessageNotString,
}

/// Check a decoded response against the JSON-RPC 2.0 rules for response objects, reporting the
/// first rule that fails.
///
/// Rules are applied in order: the value is an object, `jsonrpc` is `"2.0"`, `id` is present (of
/// any type), `result` and `error` are not both present, one of them is, and an `error` is an
/// object with an integer `code` and a string `message`.
pub fn check_response(decoded: &JsonValue) -> Result<(), ResponseViolation> {
    let object = decoded.as_object().ok_or(ResponseViolation::NotAnObject)?;

    if object.get("jsonrpc").and_then(JsonValue::as_str) != Some(JSONRPC_VERSION) {
        return Err(ResponseViolation::WrongVersion);
    }

    if !object.contains_key("id") {
        return Err(ResponseViolation::MissingId);
    }

    match (object.get("result"), object.get("error")) {
        (Some(_), Some(_)) => Err(ResponseViolation::ResultAndError),
        (None, None) => Err(ResponseViolation::NeitherResultNorError),
        (Some(_), None) => Ok(()),
        (None, Some(error)) => {
            let error = error.as_object().ok_or(ResponseViolation::ErrorNotAnObject)?;

            if !error.get("code").is_some_and(|code| code.is_i64() || code.is_u64()) {
                return Err(ResponseViolation::ErrorCodeNotInteger);
            }

            if !error.get("message").is_some_and(JsonValue::is_string) {
                return Err(ResponseViolation::ErrorMessageNotString);
            }

            Ok(())
        }
    }
}

/// Returns `true` if `decoded` is a structurally valid JSON-RPC 2.0 response object.
///
/// Never fails; see [`check_response`] to find out why a response was rejected.
pub fn validate_response(decoded: &JsonValue) -> bool {
    check_response(decoded).is_ok()
}

/// Validate a decoded response and then deserialize it.
pub(crate) fn parse_response(decoded: JsonValue) -> Result<Response> {
    if let Err(violation) = check_response(&decoded) {
        tracing::debug!(%violation, response = %decoded, "Rejecting invalid response");
        return Err(JsonRpcError::invalid_response(violation.to_string()));
    }

    serde_json::from_value::<Response>(decoded)
        .map_err(|e| JsonRpcError::invalid_response(format!("unsupported response: {e}")))
}

/// Peek at the id of a response that may not be valid, for diagnostics.
pub(crate) fn response_id(decoded: &JsonValue) -> Option<Id> {
    decoded
        .get("id")
        .and_then(|id| serde_json::from_value(id.clone()).ok())
}
