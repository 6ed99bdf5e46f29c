use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {endpoint} failed: {source}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{endpoint} answered with status {status}")]
    Status { endpoint: String, status: u16 },

    /// The body is not JSON at all, e.g. a proxy or captive portal page.
    #[error("response body is not json: {0}")]
    Unparseable(#[source] serde_json::Error),

    #[error("malformed response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("graphql error: {}", .0.join("; "))]
    Graphql(Vec<String>),
}

impl ApiError {
    /// Transport-level failures, as opposed to the server rejecting the operation.
    pub fn is_network(&self) -> bool {
        matches!(
            self,
            ApiError::Transport { .. } | ApiError::Status { .. } | ApiError::Unparseable(_)
        )
    }
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("storage io for key {key}: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid storage key {0:?}")]
    InvalidKey(String),

    #[error("cached value is not valid json: {0}")]
    Corrupt(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// User-facing classification of a failed feed fetch.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedError {
    #[error("connection error while loading posts")]
    Connection,

    #[error("unexpected error while loading posts")]
    Unexpected,
}

impl FeedError {
    pub fn classify(err: &ApiError) -> Self {
        if err.is_network() {
            FeedError::Connection
        } else {
            FeedError::Unexpected
        }
    }
}

/// A failed vote. The tally is left untouched; the caller may vote again.
#[derive(Error, Debug)]
#[error("vote {direction} on post {post_id} failed: {source}")]
pub struct VoteError {
    pub post_id: String,
    pub direction: crate::model::VoteType,
    #[source]
    pub source: ApiError,
}

impl VoteError {
    pub fn is_retryable(&self) -> bool {
        self.source.is_network()
    }
}
