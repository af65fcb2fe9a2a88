//! Top-level application component.
//!
//! The [`App`] owns configuration and builds the concrete collaborators a
//! [`Handler`] runs against.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::handler::Handler;
use crate::config::{ConfigError, ConfigHelper, ConfigSource, read_config};
use crate::event::EventError;
use crate::notify::{LogNotifier, Notifier, NotifyError, SnsNotifier};
use crate::object_store::{S3ObjectStore, S3ObjectStoreConfig};
use crate::reconcile::ReconcileError;
use crate::source_control::{GithubSourceControl, GithubSourceControlConfig, SourceControlError};

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur during App operations.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to create source control client: {0}")]
    SourceControl(#[from] SourceControlError),

    #[error("invalid event: {0}")]
    Event(#[from] EventError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error("completion notice failed: {0}")]
    Notify(#[from] NotifyError),
}

/// Result type for App operations.
pub type Result<T> = std::result::Result<T, AppError>;

// =============================================================================
// Context Types
// =============================================================================

/// Context for creating an App.
#[derive(Default)]
pub struct AppContext {
    /// Source for configuration files.
    pub config_source: ConfigSource,
}

// =============================================================================
// App
// =============================================================================

/// The top-level application component.
pub struct App {
    config: ConfigHelper,
}

impl App {
    /// Create a new App with the given context.
    pub fn new(ctx: AppContext) -> Result<Self> {
        let config_result = read_config(&ctx.config_source)?;
        for warning in &config_result.warnings {
            warn!("{}", warning);
        }

        Ok(Self {
            config: ConfigHelper::new(config_result.config),
        })
    }

    /// Get the configuration helper.
    pub fn config(&self) -> &ConfigHelper {
        &self.config
    }

    /// Build a handler wired to GitHub, S3 and the configured notifier.
    pub async fn create_handler(&self) -> Result<Handler> {
        let config = self.config.config();

        let mut github = GithubSourceControlConfig::new().with_api_url(&config.github.api_url);
        if let Some(token) = self.config.github_token()? {
            github = github.with_token(token);
        }
        let source = Arc::new(GithubSourceControl::new(github)?);

        let mut s3 = S3ObjectStoreConfig::new();
        if let Some(endpoint_url) = &config.s3.endpoint_url {
            s3 = s3.with_endpoint_url(endpoint_url);
        }
        if let Some(region) = &config.s3.region {
            s3 = s3.with_region(region);
        }
        let store = Arc::new(S3ObjectStore::new(s3).await);

        let notifier: Arc<dyn Notifier> = match self.config.sns_notifier_config() {
            Some(sns) => {
                let notifier = SnsNotifier::new(sns).await;
                info!(topic_arn = notifier.topic_arn(), "publishing completion to SNS");
                Arc::new(notifier)
            }
            None => {
                info!("no notification topic configured, completion is only logged");
                Arc::new(LogNotifier)
            }
        };

        Ok(Handler::new(source, store, notifier)
            .with_destination(self.config.destination_policy())
            .with_owner(config.github.owner.clone())
            .with_subject(&config.notify.subject)
            .with_max_concurrent_files(self.config.max_concurrent_files()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    /// A config file holding `text`, so nothing is read from the environment
    /// or the home directory.
    fn config_file(name: &str, text: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "git2s3-app-{}-{}.ini",
            name,
            std::process::id()
        ));
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_app_creation_with_overrides() {
        let path = config_file("overrides", "[github]\nowner = file-owner\n");
        let ctx = AppContext {
            config_source: ConfigSource {
                config_file: Some(path.clone()),
                overrides: vec![("github.owner".to_string(), "acme".to_string())],
                ..Default::default()
            },
        };
        let app = App::new(ctx);
        std::fs::remove_file(&path).unwrap();

        let app = app.unwrap();
        assert_eq!(app.config().config().github.owner.as_deref(), Some("acme"));
    }

    #[test]
    fn test_missing_config_file() {
        let ctx = AppContext {
            config_source: ConfigSource {
                config_file: Some(PathBuf::from("/nonexistent/git2s3config")),
                ..Default::default()
            },
        };
        assert!(matches!(App::new(ctx), Err(AppError::Config(_))));
    }

    #[test]
    fn test_bad_override() {
        let path = config_file("bad-override", "");
        let ctx = AppContext {
            config_source: ConfigSource {
                config_file: Some(path.clone()),
                overrides: vec![("github.colour".to_string(), "blue".to_string())],
                ..Default::default()
            },
        };
        let app = App::new(ctx);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(app, Err(AppError::Config(_))));
    }
}
