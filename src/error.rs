use thiserror::Error;

/// Main error type for the relay
#[derive(Error, Debug)]
pub enum RelayError {
    // Protocol errors
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl RelayError {
    /// Short machine-readable label, used as the `error` field of HTTP responses
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Unauthorized(_) => "Unauthorized",
            RelayError::InvalidArgument(_) => "InvalidArgument",
            RelayError::NotFound(_) => "NotFound",
            _ => "Internal",
        }
    }
}

/// Result type alias for RelayError
pub type Result<T> = std::result::Result<T, RelayError>;
