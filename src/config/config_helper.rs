//! Configuration helper for interpreting config values.
//!
//! The `ConfigHelper` wraps a `Config` and resolves the values that need more
//! than a lookup: the API token, the bucket naming policy, the SNS settings and
//! the effective fan-out limit.

use std::fs;
use std::sync::Arc;

use super::read_config::{ConfigError, Result};
use super::{Config, Limit};
use crate::destination::{DestinationPolicy, SuffixedRepositories};
use crate::notify::SnsNotifierConfig;

/// Helper for interpreting configuration values.
#[derive(Debug, Clone)]
pub struct ConfigHelper {
    config: Config,
}

impl ConfigHelper {
    /// Create a new ConfigHelper wrapping the given config.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Get a reference to the underlying config.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The API token. An inline token wins over a token file; the file's
    /// content is trimmed.
    pub fn github_token(&self) -> Result<Option<String>> {
        let github = &self.config.github;
        if let Some(token) = &github.token {
            return Ok(Some(token.clone()));
        }
        let Some(path) = &github.token_file else {
            return Ok(None);
        };
        let content = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.clone(),
            source,
        })?;
        let token = content.trim();
        Ok((!token.is_empty()).then(|| token.to_string()))
    }

    /// Bucket naming policy built from `[buckets] suffixed_repositories`.
    pub fn destination_policy(&self) -> DestinationPolicy {
        let suffixed: SuffixedRepositories = self
            .config
            .buckets
            .suffixed_repositories
            .iter()
            .cloned()
            .collect();
        DestinationPolicy::new(Arc::new(suffixed))
    }

    /// SNS settings, or `None` when no topic is configured.
    ///
    /// Without `[notify] region` the region is taken from the topic ARN
    /// (`arn:aws:sns:<region>:<account>:<name>`).
    pub fn sns_notifier_config(&self) -> Option<SnsNotifierConfig> {
        let notify = &self.config.notify;
        let topic_arn = notify.topic_arn.as_deref()?;

        let mut sns = SnsNotifierConfig::new(topic_arn);
        let region = notify
            .region
            .as_deref()
            .or_else(|| topic_arn.split(':').nth(3).filter(|r| !r.is_empty()));
        if let Some(region) = region {
            sns = sns.with_region(region);
        }
        if let Some(endpoint_url) = &notify.endpoint_url {
            sns = sns.with_endpoint_url(endpoint_url);
        }
        Some(sns)
    }

    /// Effective fan-out bound. `None` means unbounded.
    pub fn max_concurrent_files(&self) -> Option<usize> {
        match self.config.network.max_concurrent_requests {
            Limit::Value(n) => Some(n as usize),
            Limit::Disabled => None,
            Limit::Inherit => Some(crate::reconcile::DEFAULT_MAX_CONCURRENT_FILES),
        }
    }
}

#[cfg(test)]
mod tests {
    use configparser::ini::Ini;

    use super::super::read_config::{apply_ini_to_config, default_config};
    use super::*;

    fn helper(text: &str) -> ConfigHelper {
        let mut ini = Ini::new();
        ini.read(text.to_string()).unwrap();
        let mut config = default_config();
        apply_ini_to_config(&mut config, &ini).unwrap();
        ConfigHelper::new(config)
    }

    #[test]
    fn test_inline_token_wins() {
        let h = helper("[github]\ntoken = inline\ntoken_file = /nonexistent/token\n");
        assert_eq!(h.github_token().unwrap().as_deref(), Some("inline"));
    }

    #[test]
    fn test_token_file_is_trimmed() {
        let path = std::env::temp_dir().join(format!("git2s3-token-{}", std::process::id()));
        std::fs::write(&path, "  secret-token\n\n").unwrap();

        let h = helper(&format!("[github]\ntoken_file = {}\n", path.display()));
        let token = h.github_token();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(token.unwrap().as_deref(), Some("secret-token"));
    }

    #[test]
    fn test_missing_token_file_is_an_error() {
        let h = helper("[github]\ntoken_file = /nonexistent/token\n");
        assert!(matches!(
            h.github_token(),
            Err(ConfigError::ReadError { .. })
        ));
    }

    #[test]
    fn test_no_token() {
        assert_eq!(helper("").github_token().unwrap(), None);
    }

    #[test]
    fn test_destination_policy() {
        let policy = helper("[buckets]\nsuffixed_repositories = website\n").destination_policy();

        assert_eq!(
            policy.resolve("website", "refs/heads/master").name,
            "website-prod"
        );
        assert_eq!(policy.resolve("tools", "refs/heads/master").name, "tools");
    }

    #[test]
    fn test_max_concurrent_files() {
        assert_eq!(helper("").max_concurrent_files(), Some(16));

        let mut h = helper("[network]\nmax_concurrent_requests = 2\n");
        assert_eq!(h.max_concurrent_files(), Some(2));
        h.config.network.max_concurrent_requests = Limit::Inherit;
        assert_eq!(h.max_concurrent_files(), Some(16));
        h.config.network.max_concurrent_requests = Limit::Disabled;
        assert_eq!(h.max_concurrent_files(), None);
    }

    #[test]
    fn test_sns_settings() {
        assert!(helper("").sns_notifier_config().is_none());

        // The [s3] region never leaks into the SNS client.
        let sns = helper(
            "[s3]\nregion = us-west-2\n[notify]\ntopic_arn = arn:aws:sns:eu-west-1:123456789012:uploads\n",
        )
        .sns_notifier_config()
        .unwrap();
        assert_eq!(sns.topic_arn, "arn:aws:sns:eu-west-1:123456789012:uploads");
        assert_eq!(sns.region.as_deref(), Some("eu-west-1"));
        assert!(sns.endpoint_url.is_none());

        let sns = helper(
            "[notify]\ntopic_arn = arn:aws:sns:eu-west-1:123456789012:uploads\nregion = us-east-1\nendpoint_url = http://localhost:4566\n",
        )
        .sns_notifier_config()
        .unwrap();
        assert_eq!(sns.region.as_deref(), Some("us-east-1"));
        assert_eq!(sns.endpoint_url.as_deref(), Some("http://localhost:4566"));

        let sns = helper("[notify]\ntopic_arn = uploads\n")
            .sns_notifier_config()
            .unwrap();
        assert!(sns.region.is_none());
    }
}
