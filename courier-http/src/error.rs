use courier_jsonrpc as jsonrpc;
use thiserror::Error;

pub type Result<T, E = HttpTransportError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum HttpTransportError {
    #[error("Error building HTTP client")]
    BuildClient { source: reqwest::Error },

    #[error("HTTP POST to '{url}' failed")]
    Request { source: reqwest::Error, url: String },

    #[error("Error reading HTTP response body from '{url}' (status {status})")]
    ReadBody {
        source: reqwest::Error,
        url: String,
        status: reqwest::StatusCode,
    },

    #[error(transparent)]
    JsonRpcBind { source: jsonrpc::JsonRpcError },
}

impl HttpTransportError {
    /// Whether this failure was the configured request timeout expiring
    pub fn is_timeout(&self) -> bool {
        match self {
            Self::Request { source, .. } | Self::ReadBody { source, .. } => source.is_timeout(),
            Self::BuildClient { .. } | Self::JsonRpcBind { .. } => false,
        }
    }
}
