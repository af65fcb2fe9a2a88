use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_sns::Client;
use aws_sdk_sns::error::SdkError;
use tracing::debug;

use super::notifier::{Notifier, NotifyError, Result};

/// Configuration for SnsNotifier.
#[derive(Debug, Clone)]
pub struct SnsNotifierConfig {
    pub topic_arn: String,
    /// Optional custom endpoint URL (for LocalStack testing).
    pub endpoint_url: Option<String>,
    pub region: Option<String>,
}

impl SnsNotifierConfig {
    pub fn new(topic_arn: impl Into<String>) -> Self {
        Self {
            topic_arn: topic_arn.into(),
            endpoint_url: None,
            region: None,
        }
    }

    pub fn with_endpoint_url(mut self, endpoint_url: impl Into<String>) -> Self {
        self.endpoint_url = Some(endpoint_url.into());
        self
    }

    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }
}

/// Publishes completion notifications to an SNS topic.
pub struct SnsNotifier {
    client: Client,
    topic_arn: String,
}

impl SnsNotifier {
    /// Uses the standard AWS credential chain.
    pub async fn new(config: SnsNotifierConfig) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &config.region {
            loader = loader.region(aws_sdk_sns::config::Region::new(region.clone()));
        }
        let aws_config = loader.load().await;

        let mut builder = aws_sdk_sns::config::Builder::from(&aws_config);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            topic_arn: config.topic_arn,
        }
    }

    pub fn topic_arn(&self) -> &str {
        &self.topic_arn
    }
}

#[async_trait]
impl Notifier for SnsNotifier {
    async fn notify(&self, subject: &str, message: &str) -> Result<()> {
        let output = self
            .client
            .publish()
            .topic_arn(&self.topic_arn)
            .subject(subject)
            .message(message)
            .send()
            .await
            .map_err(|err| NotifyError::PublishFailed {
                topic: self.topic_arn.clone(),
                message: match &err {
                    SdkError::ServiceError(e) => format!("{:?}", e.err()),
                    other => format!("{:?}", other),
                },
            })?;

        debug!(
            topic = %self.topic_arn,
            message_id = output.message_id().unwrap_or_default(),
            "published completion"
        );
        Ok(())
    }
}
