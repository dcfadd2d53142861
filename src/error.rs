//! Vordr error types

/// Vordr error types
#[derive(Debug, thiserror::Error)]
pub enum VordrError {
    // Network errors
    #[error("network error: {0}")]
    Network(String),

    // Storage errors
    /// Cache open or put failure, including quota exhaustion. There is no
    /// eviction policy below generation granularity; a full store is a
    /// hard failure.
    #[error("storage error: {0}")]
    Storage(String),

    // Lifecycle errors
    /// A manifest asset could not be fetched during install. The install
    /// attempt is abandoned wholesale; no partial static cache is committed.
    #[error("install failed for {asset}: {reason}")]
    InstallFailed { asset: String, reason: String },

    #[error("invalid lifecycle transition: {from} -> {to}")]
    Lifecycle { from: String, to: String },

    // Configuration errors
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("configuration error: {0}")]
    Configuration(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<reqwest::Error> for VordrError {
    fn from(err: reqwest::Error) -> Self {
        VordrError::Network(err.to_string())
    }
}

/// Result type alias for Vordr operations
pub type Result<T> = std::result::Result<T, VordrError>;
