use std::time::Duration;

/// Failure of a single round-trip against the task API.
/// Cloneable so coalesced fetches can hand the same failure to every waiter.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// The request never reached the server or no response came back.
    #[error("network error: {0}")]
    Network(String),
    #[error("timeout after {0:?}")]
    Timeout(Duration),
    /// Non-2xx response.
    #[error("server error {status}: {body}")]
    Server { status: u16, body: String },
    /// 2xx response whose body could not be read as expected.
    #[error("could not decode response: {0}")]
    Decode(String),
}

impl RemoteError {
    /// Whether a caller-side retry could plausibly succeed. Nothing in this
    /// workspace retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout(_) => true,
            Self::Server { status, .. } => *status == 429 || *status >= 500,
            Self::Decode(_) => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        if let Self::Server { status, .. } = self {
            Some(*status)
        } else {
            None
        }
    }

    /// Short classification string for logging.
    pub fn error_kind(&self) -> &'static str {
        match self {
            Self::Network(_) => "network_error",
            Self::Timeout(_) => "timeout",
            Self::Server { .. } => "server_error",
            Self::Decode(_) => "decode_error",
        }
    }
}

/// Client-side input rejection. Raised before any request is issued.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("title is required")]
    EmptyTitle,
    #[error("invalid due date {0:?}, expected YYYY-MM-DD")]
    InvalidDueDate(String),
    #[error("unknown status {0:?}")]
    UnknownStatus(String),
    #[error("unknown sort order {0:?}, expected one of: title-asc, title-desc, pending-first, in-progress-first")]
    UnknownSortOrder(String),
}
