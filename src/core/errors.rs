use thiserror::Error;

#[derive(Error, Debug)]
pub enum LexiqError {
    #[error("I/O error: {0}")]
    Io(Box<std::io::Error>),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Reqwest error: {0}")]
    Reqwest(Box<reqwest::Error>),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Key-value store error: {0}")]
    Store(String),

    #[error("LexiqError: {0}")]
    Custom(String),
}

impl From<std::io::Error> for LexiqError {
    fn from(error: std::io::Error) -> Self {
        LexiqError::Io(Box::new(error))
    }
}

impl From<reqwest::Error> for LexiqError {
    fn from(error: reqwest::Error) -> Self {
        LexiqError::Reqwest(Box::new(error))
    }
}

/// Failures surfaced by the API gateway.
///
/// Timeouts are synthesized locally and carry status 408 so callers can treat
/// them like any other HTTP failure.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    #[error("request to {endpoint} was cancelled")]
    Cancelled { endpoint: String },

    #[error("unauthorized (401), stored tokens cleared")]
    Unauthorized,

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("transport error: {0}")]
    Transport(Box<reqwest::Error>),

    #[error("failed to decode response from {endpoint}: {message}")]
    Decode { endpoint: String, message: String },

    #[error("failed to encode request body for {endpoint}: {message}")]
    Encode { endpoint: String, message: String },

    #[error("key-value store error: {0}")]
    Store(String),
}

impl ApiError {
    pub const TIMEOUT_STATUS: u16 = 408;

    /// HTTP status associated with the failure, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Timeout { .. } => Some(Self::TIMEOUT_STATUS),
            ApiError::Unauthorized => Some(401),
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Transport(e) => e.status().map(|s| s.as_u16()),
            ApiError::Cancelled { .. }
            | ApiError::Decode { .. }
            | ApiError::Encode { .. }
            | ApiError::Store(_) => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(error: reqwest::Error) -> Self {
        ApiError::Transport(Box::new(error))
    }
}
