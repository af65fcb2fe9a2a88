//! Destination resolution: ref classification and bucket naming.

mod branch_classifier;
mod bucket_policy;

pub use branch_classifier::{DEVELOPMENT_SUFFIX, PRODUCTION_SUFFIX, classify};
pub use bucket_policy::{Bucket, BucketPolicy, DestinationPolicy, SuffixedRepositories};
