//! Content resolution: raw bytes plus media type for one file revision.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use bytes::Bytes;

use super::error::{ContentError, Result};
use super::media_type;
use crate::source_control::{ContentRef, SourceControl};

/// Body of a resolved file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBody {
    /// Content whose media type declares a UTF-8 charset.
    Text(String),
    /// Everything else, kept as raw bytes.
    Binary(Bytes),
}

impl ContentBody {
    pub fn len(&self) -> usize {
        match self {
            ContentBody::Text(text) => text.len(),
            ContentBody::Binary(bytes) => bytes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The bytes to upload.
    pub fn into_bytes(self) -> Bytes {
        match self {
            ContentBody::Text(text) => Bytes::from(text),
            ContentBody::Binary(bytes) => bytes,
        }
    }
}

/// One file's content, ready to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedContent {
    pub body: ContentBody,
    pub media_type: String,
}

impl ResolvedContent {
    pub fn is_textual(&self) -> bool {
        matches!(self.body, ContentBody::Text(_))
    }
}

/// Resolves a [`ContentRef`] into uploadable content.
///
/// Implementations do not retry; a failed fetch is reported once.
#[async_trait]
pub trait ContentResolver: Send + Sync {
    async fn resolve(&self, content: &ContentRef) -> Result<ResolvedContent>;
}

/// A [`ContentResolver`] that fetches blobs from a [`SourceControl`].
pub struct SourceControlResolver {
    source: Arc<dyn SourceControl>,
}

impl SourceControlResolver {
    pub fn new(source: Arc<dyn SourceControl>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl ContentResolver for SourceControlResolver {
    async fn resolve(&self, content: &ContentRef) -> Result<ResolvedContent> {
        let encoded = self
            .source
            .get_blob(&content.owner, &content.repository, &content.blob_sha)
            .await
            .map_err(|source| ContentError::FetchFailed {
                path: content.path.clone(),
                source,
            })?;

        let raw = decode_base64(&encoded).map_err(|message| ContentError::Decode {
            path: content.path.clone(),
            message,
        })?;

        Ok(to_resolved(&content.path, raw))
    }
}

/// Decode base64 text that may be wrapped across lines.
pub fn decode_base64(encoded: &str) -> std::result::Result<Vec<u8>, String> {
    let compact: String = encoded
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();
    STANDARD.decode(compact).map_err(|e| e.to_string())
}

/// Infer the media type for `path` and decide the body's disposition.
pub fn to_resolved(path: &str, raw: Vec<u8>) -> ResolvedContent {
    let media_type = media_type::lookup(path);
    let body = if media_type::is_textual(media_type) {
        ContentBody::Text(String::from_utf8_lossy(&raw).into_owned())
    } else {
        ContentBody::Binary(Bytes::from(raw))
    };
    ResolvedContent {
        body,
        media_type: media_type.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_control::MemorySourceControl;

    fn content_ref(path: &str, sha: &str) -> ContentRef {
        ContentRef {
            owner: "acme".to_string(),
            repository: "demo".to_string(),
            path: path.to_string(),
            blob_sha: sha.to_string(),
        }
    }

    #[test]
    fn test_decode_wrapped_base64() {
        assert_eq!(decode_base64("aGVs\nbG8=\n").unwrap(), b"hello");
        assert_eq!(decode_base64("").unwrap(), b"");
        assert!(decode_base64("not base64!").is_err());
    }

    #[test]
    fn test_to_resolved_text_and_binary() {
        let text = to_resolved("a.txt", b"hello".to_vec());
        assert_eq!(text.media_type, "text/plain");
        assert!(text.is_textual());
        assert_eq!(text.body, ContentBody::Text("hello".to_string()));

        let png = to_resolved("c.png", vec![0x89, 0x50, 0x4e, 0x47]);
        assert_eq!(png.media_type, "image/png");
        assert!(!png.is_textual());
        assert_eq!(png.body.len(), 4);
    }

    #[test]
    fn test_invalid_utf8_text_is_replaced() {
        let resolved = to_resolved("notes.txt", vec![b'o', b'k', 0xff]);
        assert_eq!(resolved.body, ContentBody::Text("ok\u{fffd}".to_string()));
    }

    #[tokio::test]
    async fn test_resolve_from_source_control() {
        let sc = Arc::new(MemorySourceControl::new());
        sc.insert_blob("s1", b"console.log(1);");
        let resolver = SourceControlResolver::new(sc);

        let resolved = resolver.resolve(&content_ref("new/b.js", "s1")).await.unwrap();
        assert_eq!(resolved.media_type, "application/javascript");
        assert_eq!(
            resolved.body.into_bytes(),
            Bytes::from_static(b"console.log(1);")
        );
    }

    #[tokio::test]
    async fn test_resolve_fetch_failed() {
        let sc = Arc::new(MemorySourceControl::new());
        let resolver = SourceControlResolver::new(sc);

        let err = resolver.resolve(&content_ref("a.txt", "missing")).await.unwrap_err();
        assert!(matches!(err, ContentError::FetchFailed { .. }));
        assert_eq!(err.path(), "a.txt");
    }

    #[tokio::test]
    async fn test_resolve_decode_failure() {
        let sc = Arc::new(MemorySourceControl::new());
        sc.insert_encoded_blob("bad", "%%%");
        let resolver = SourceControlResolver::new(sc);

        let err = resolver.resolve(&content_ref("a.txt", "bad")).await.unwrap_err();
        assert!(matches!(err, ContentError::Decode { .. }));
    }
}
