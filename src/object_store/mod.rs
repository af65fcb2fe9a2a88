//! Object store gateway: idempotent put and delete of whole objects.

mod memory_object_store;
#[allow(clippy::module_inception)]
mod object_store;
mod s3_object_store;

pub use memory_object_store::{MemoryObjectStore, StoreCall, StoredObject};
pub use object_store::{ObjectStore, Result, StoreError};
pub use s3_object_store::{S3ObjectStore, S3ObjectStoreConfig};
