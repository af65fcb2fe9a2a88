//! Content resolution for changed files.

mod content_resolver;
mod error;
pub mod media_type;

pub use content_resolver::{
    ContentBody, ContentResolver, ResolvedContent, SourceControlResolver, decode_base64,
    to_resolved,
};
pub use error::{ContentError, Result};
