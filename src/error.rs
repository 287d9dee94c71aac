use thiserror::Error;

/// Main error type for the dashboard client
#[derive(Error, Debug)]
pub enum DeskError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // Network errors
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Network error: {0}")]
    Network(String),

    // Authorization errors (401 from the backend)
    #[error("Unauthorized: the session credential was rejected")]
    Unauthorized,

    // Non-401 error statuses
    #[error("API error {status}: {detail}")]
    Api { status: u16, detail: String },

    // Payload contract errors
    #[error("Malformed payload from {endpoint}: {reason}")]
    MalformedPayload { endpoint: String, reason: String },

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    // Client-side validation errors
    #[error("Validation failed: {0}")]
    Validation(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Generic errors
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Operation cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

/// Result type alias for DeskError
pub type Result<T> = std::result::Result<T, DeskError>;

/// Coarse error classes used by pages to pick a handling policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// No response was received
    Transport,
    /// The backend answered 401
    Authorization,
    /// Rejected on the client before any request was made
    Validation,
    /// Any other error status from the backend
    Server,
    /// A 2xx response whose body broke the declared contract
    Malformed,
    /// Local failures (config, IO, cancellation)
    Internal,
}

impl DeskError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeskError::Http(_) | DeskError::Network(_) => ErrorKind::Transport,
            DeskError::Unauthorized => ErrorKind::Authorization,
            DeskError::Validation(_) => ErrorKind::Validation,
            DeskError::Api { .. } => ErrorKind::Server,
            DeskError::MalformedPayload { .. } | DeskError::Json(_) => ErrorKind::Malformed,
            DeskError::Config(_)
            | DeskError::Io(_)
            | DeskError::Internal(_)
            | DeskError::Cancelled
            | DeskError::Other(_) => ErrorKind::Internal,
        }
    }

    /// 401s are handled once, globally, by the API client and session owner
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, DeskError::Unauthorized)
    }
}
