/// Errors raised while decoding an inbound event.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    #[error("malformed envelope: {0}")]
    Envelope(#[source] serde_json::Error),

    #[error("envelope contains no records")]
    NoRecords,

    #[error("malformed push payload: {0}")]
    Payload(#[source] serde_json::Error),

    /// The push carries no head commit, as for a deleted branch.
    #[error("push to {git_ref} has no head commit")]
    NoHeadCommit { git_ref: String },

    #[error("push payload for {repository} names no owner")]
    MissingOwner { repository: String },
}

/// Result type for event decoding.
pub type Result<T> = std::result::Result<T, EventError>;
