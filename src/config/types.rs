//! Configuration types for git2s3.
//!
//! This module defines the structures used to represent application configuration
//! as parsed from an INI-format config file.

use std::path::PathBuf;

// =============================================================================
// Primitive Types
// =============================================================================

/// Represents a limit that can be inherited, disabled, or set.
///
/// - `Inherit`: Not specified in config; keep the value from an earlier layer
/// - `Disabled`: Explicitly set to "none"; no limit applies
/// - `Value(T)`: Specific limit value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Limit<T> {
    Inherit,
    Disabled,
    Value(T),
}

// =============================================================================
// Config Sections
// =============================================================================

/// [github] section - source control API access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GithubConfig {
    pub api_url: String,
    /// Repository owner. When unset, the owner named by the push payload is used.
    pub owner: Option<String>,
    pub token: Option<String>,
    /// File whose first line holds the token.
    pub token_file: Option<PathBuf>,
}

/// [s3] section - object store connection settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct S3Settings {
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

/// [buckets] section - destination bucket naming.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketsConfig {
    /// Repositories whose bucket name carries the branch suffix.
    pub suffixed_repositories: Vec<String>,
}

/// [network] section - fan-out limits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkConfig {
    pub max_concurrent_requests: Limit<u32>,
}

/// [notify] section - completion notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotifyConfig {
    /// SNS topic. When unset, completion is only logged.
    pub topic_arn: Option<String>,
    pub subject: String,
    /// SNS region. Defaults to the region named in `topic_arn`.
    pub region: Option<String>,
    /// Optional custom SNS endpoint (for LocalStack testing).
    pub endpoint_url: Option<String>,
}

// =============================================================================
// Top-Level Config
// =============================================================================

/// Complete application configuration as parsed from config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub github: GithubConfig,
    pub s3: S3Settings,
    pub buckets: BucketsConfig,
    pub network: NetworkConfig,
    pub notify: NotifyConfig,
}
