//! HTTP transport for the `courier-jsonrpc` client.
//!
//! Every JSON-RPC payload, single or batch, is sent as the body of an HTTP POST to the endpoint
//! URL, and the body of the HTTP response is handed back to the client to decode and validate.
//! HTTP status codes are not interpreted here: plenty of JSON-RPC servers answer errors with a 4xx
//! or 5xx status and a perfectly good JSON-RPC error object in the body.

mod error;
#[cfg(test)]
mod testing;
mod transport;

pub use error::{HttpTransportError, Result};
pub use transport::{HttpTransport, HttpTransportConfig, connect};
