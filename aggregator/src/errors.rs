use axum::http::StatusCode;
use thiserror::Error;

/// Result type alias for aggregator operations
pub type Result<T, E = AggregatorError> = std::result::Result<T, E>;

/// Errors that can occur while serving a posts request
#[derive(Error, Debug)]
pub enum AggregatorError {
    #[error("Tags parameter is required")]
    TagsRequired,

    #[error("sortBy parameter is invalid")]
    InvalidSortBy,

    #[error("Direction parameter is invalid")]
    InvalidDirection,

    #[error("Invalid query string: {0}")]
    InvalidQuery(String),

    #[error("Upstream request failed for tag {tag}: {reason}")]
    UpstreamRequestFailed { tag: String, reason: String },

    #[error("Upstream returned {status} for tag {tag}")]
    UpstreamStatus { tag: String, status: u16 },

    #[error("Upstream returned a malformed body for tag {tag}: {reason}")]
    UpstreamMalformedBody { tag: String, reason: String },

    #[error("Upstream timeout for tag {0}")]
    UpstreamTimeout(String),

    #[error("Internal error: {0}")]
    InternalError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AggregatorError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AggregatorError::TagsRequired
            | AggregatorError::InvalidSortBy
            | AggregatorError::InvalidDirection
            | AggregatorError::InvalidQuery(_) => StatusCode::BAD_REQUEST,
            AggregatorError::UpstreamRequestFailed { .. }
            | AggregatorError::UpstreamStatus { .. }
            | AggregatorError::UpstreamMalformedBody { .. } => StatusCode::BAD_GATEWAY,
            AggregatorError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AggregatorError::InternalError(_)
            | AggregatorError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message sent back to the client. Upstream and internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self.status_code() {
            StatusCode::BAD_REQUEST => self.to_string(),
            StatusCode::BAD_GATEWAY => "Upstream request failed".to_string(),
            StatusCode::GATEWAY_TIMEOUT => "Upstream request timed out".to_string(),
            _ => "Internal server error".to_string(),
        }
    }
}
