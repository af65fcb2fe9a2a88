//! Error types for source control operations.

/// Error type for source control operations.
#[derive(Debug, thiserror::Error)]
pub enum SourceControlError {
    /// The commit or blob does not exist (or is not visible with the configured token).
    #[error("not found: {0}")]
    NotFound(String),

    /// The API answered with an unexpected status code.
    #[error("unexpected status {status} from {url}: {message}")]
    Http {
        url: String,
        status: u16,
        message: String,
    },

    /// The request never produced a response.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The response body could not be decoded.
    #[error("failed to decode response from {url}: {message}")]
    Decode { url: String, message: String },

    /// Other error.
    #[error("{0}")]
    Other(String),
}

/// Result type for source control operations.
pub type Result<T> = std::result::Result<T, SourceControlError>;
