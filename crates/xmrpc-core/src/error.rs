use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("transport failure: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("daemon answered HTTP {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },

    #[error("authentication with {url} failed: {reason}")]
    Authentication { url: String, reason: String },

    #[error("malformed JSON-RPC response: {0}")]
    MalformedResponse(String),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl CoreError {
    /// True for failures that happened below the JSON-RPC layer: connection
    /// errors, timeouts and non-auth HTTP statuses.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::HttpStatus { .. })
    }

    /// The HTTP status attached to the error, if the daemon answered at all.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            Self::Transport(err) => err.status(),
            _ => None,
        }
    }
}

/// Longest slice of a response body kept inside an error message.
pub(crate) const MAX_BODY_EXCERPT: usize = 512;

/// Bound a response body for use in error messages, noting the full size
/// when it had to be cut.
pub(crate) fn body_excerpt(body: &str) -> String {
    match body.char_indices().nth(MAX_BODY_EXCERPT) {
        None => body.to_owned(),
        Some((cut, _)) => format!("{}… ({} bytes total)", &body[..cut], body.len()),
    }
}

/// Application-level error returned by the daemon in the `error` member of
/// a JSON-RPC response. Code and message are kept exactly as sent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("daemon returned error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    pub data: Option<serde_json::Value>,
}
