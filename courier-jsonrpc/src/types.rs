//! Rust struct definitions that ser/de to/from JSON-RPC messages.
//!
//! Only the client half of the protocol lives here: outgoing requests, and the responses that come
//! back for them.  Incoming responses are checked by [`crate::validate`] against the raw JSON
//! before they are ever deserialized into these types.
use std::fmt;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Re-export the structs and enums that are part of the JSON-RPC protocol
///
/// No need to re-invent this wheel.
pub use jsonrpsee_types::{error::ErrorCode, params::TwoPointZero};
pub use serde_json::Value as JsonValue;

/// Request Id
///
/// Outgoing requests only ever carry the first three kinds.  Responses may echo back any JSON
/// value as their id, so deserialization never fails:
///
/// - a float with an exact non-negative integer value, like `1.0`, becomes [`Id::Number`], so it
///   still matches the request it answers;
/// - anything else that isn't null, a `u64` or a string (negative or fractional numbers, booleans,
///   arrays, objects) becomes [`Id::Other`] holding its compact JSON text.  Such an id never
///   matches a request this client sent.
#[derive(Debug, PartialEq, Clone, Hash, Eq, PartialOrd, Ord)]
pub enum Id {
    /// Null
    Null,
    /// Numeric id
    Number(u64),
    /// String id
    Str(String),
    /// Any other JSON value, as compact JSON text
    Other(String),
}

impl Id {
    /// Ids that can't be used to correlate a response with its request: `null` and the empty
    /// string.
    pub fn is_empty(&self) -> bool {
        match self {
            Id::Null => true,
            Id::Number(_) | Id::Other(_) => false,
            Id::Str(s) => s.is_empty(),
        }
    }

    /// Interpret an arbitrary JSON value as an id.
    pub fn from_json(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => Id::Null,
            JsonValue::String(s) => Id::Str(s),
            JsonValue::Number(n) => {
                let integral = n.as_u64().or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && *f >= 0.0 && *f < u64::MAX as f64)
                        .map(|f| f as u64)
                });
                match integral {
                    Some(n) => Id::Number(n),
                    None => Id::Other(n.to_string()),
                }
            }
            other => Id::Other(other.to_string()),
        }
    }
}

impl Serialize for Id {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Id::Null => serializer.serialize_unit(),
            Id::Number(n) => serializer.serialize_u64(*n),
            Id::Str(s) => serializer.serialize_str(s),
            Id::Other(raw) => serde_json::from_str::<JsonValue>(raw)
                .map_err(serde::ser::Error::custom)?
                .serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Id {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        JsonValue::deserialize(deserializer).map(Id::from_json)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Null => f.write_str("null"),
            Id::Number(n) => write!(f, "{n}"),
            Id::Str(s) => write!(f, "\"{s}\""),
            Id::Other(raw) => f.write_str(raw),
        }
    }
}

impl From<u64> for Id {
    fn from(value: u64) -> Self {
        Id::Number(value)
    }
}

impl From<String> for Id {
    fn from(value: String) -> Self {
        Id::Str(value)
    }
}

impl From<&str> for Id {
    fn from(value: &str) -> Self {
        Id::Str(value.to_string())
    }
}

/// Serializable [JSON-RPC request object](https://www.jsonrpc.org/specification#request-object).
///
/// Requests are built by [`crate::EnvelopeBuilder`], which enforces the rules about method names
/// and ids.  Once built they are never modified.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Request {
    /// JSON-RPC version.
    pub jsonrpc: TwoPointZero,
    /// Name of the method to be invoked, including any namespace prefix.
    pub method: String,
    /// Parameter values of the request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<JsonValue>,
    /// Request ID
    pub id: Id,
}

impl Request {
    /// Create a serializable JSON-RPC method call.
    pub(crate) fn new(id: Id, method: impl Into<String>, params: impl Into<Option<JsonValue>>) -> Self {
        Self {
            jsonrpc: TwoPointZero,
            method: method.into(),
            params: params.into(),
            id,
        }
    }
}

/// JSON-RPC response object as defined in the [spec](https://www.jsonrpc.org/specification#response_object).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// JSON-RPC version.
    pub jsonrpc: TwoPointZero,
    /// Payload which can be result or error.
    #[serde(flatten)]
    pub payload: ResponsePayload,
    /// Request ID
    pub id: Id,
}

impl Response {
    /// Create a owned successful response
    pub fn success(id: Id, result: JsonValue) -> Self {
        Self {
            jsonrpc: TwoPointZero,
            payload: ResponsePayload::Success(SuccessResponse { result }),
            id,
        }
    }

    /// Create an error response
    pub fn error(
        id: Id,
        code: ErrorCode,
        message: impl Into<String>,
        data: impl Into<Option<JsonValue>>,
    ) -> Self {
        Self {
            jsonrpc: TwoPointZero,
            payload: ResponsePayload::Error(ErrorResponse {
                error: ErrorDetails::new(code, message, data),
            }),
            id,
        }
    }
}

/// Possible payloads of a JSON RPC response
///
/// This is an `untagged` enum so that serde will try to deserialize into each variant in order
/// until one succeeds.  This works because successs responses should have `result` and error
/// responses should have `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponsePayload {
    /// Corresponds to failed JSON-RPC response with a error object with the field `error.
    Error(ErrorResponse),
    /// Corresponds to successful JSON-RPC response with the field `result`.
    Success(SuccessResponse),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub result: JsonValue,
}

/// [Failed JSON-RPC response object](https://www.jsonrpc.org/specification#error_object).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// [JSON-RPC failed response error details](https://www.jsonrpc.org/specification#error_object).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Code
    ///
    /// Any integer is accepted on the wire.  Codes outside the `i32` range saturate to
    /// `i32::MIN` or `i32::MAX`.
    #[serde(deserialize_with = "deserialize_error_code")]
    pub code: ErrorCode,
    /// Message
    pub message: String,
    /// Optional data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: impl Into<String>, data: impl Into<Option<JsonValue>>) -> Self {
        Self {
            code,
            message: message.into(),
            data: data.into(),
        }
    }
}

fn deserialize_error_code<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ErrorCode, D::Error> {
    let code = serde_json::Number::deserialize(deserializer)?;
    let code = match (code.as_i64(), code.as_u64()) {
        (Some(code), _) => code.clamp(i32::MIN.into(), i32::MAX.into()) as i32,
        (None, Some(_)) => i32::MAX,
        (None, None) => return Err(D::Error::custom(format!("error code {code} is not an integer"))),
    };

    Ok(ErrorCode::from(code))
}
