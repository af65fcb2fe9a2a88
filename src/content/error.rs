use crate::source_control::SourceControlError;

/// Error type for content resolution.
#[derive(Debug, thiserror::Error)]
pub enum ContentError {
    /// The content could not be retrieved from source control.
    #[error("failed to fetch {path}: {source}")]
    FetchFailed {
        path: String,
        #[source]
        source: SourceControlError,
    },

    /// The content was retrieved but was not valid base64.
    #[error("failed to decode {path}: {message}")]
    Decode { path: String, message: String },
}

impl ContentError {
    /// Path of the file whose content could not be resolved.
    pub fn path(&self) -> &str {
        match self {
            ContentError::FetchFailed { path, .. } | ContentError::Decode { path, .. } => path,
        }
    }
}

/// Result type for content resolution.
pub type Result<T> = std::result::Result<T, ContentError>;
