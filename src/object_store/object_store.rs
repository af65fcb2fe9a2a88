use async_trait::async_trait;
use bytes::Bytes;

/// Error type for object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store rejected or failed the operation.
    #[error("{op} {bucket}/{key} failed: {message}")]
    Failed {
        op: &'static str,
        bucket: String,
        key: String,
        message: String,
    },
}

impl StoreError {
    pub fn failed(
        op: &'static str,
        bucket: impl Into<String>,
        key: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        StoreError::Failed {
            op,
            bucket: bucket.into(),
            key: key.into(),
            message: message.into(),
        }
    }
}

/// Result type for object store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Whole-object put/delete against a bucketed object store.
///
/// Both operations are idempotent: a put replaces any previous object under
/// the key, and deleting a missing key succeeds. Implementations do not retry.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, bucket: &str, key: &str, body: Bytes, media_type: &str) -> Result<()>;

    async fn delete(&self, bucket: &str, key: &str) -> Result<()>;
}
