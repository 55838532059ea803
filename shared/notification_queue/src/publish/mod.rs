//! Direct topic delivery
//!
//! Used when notifications bypass the queue and go straight to an SNS topic.

mod error;

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_sns::Client as SnsClient;

pub use error::{PublishError, PublishResult};

/// Publishes a message to a pub/sub topic
#[async_trait]
pub trait TopicPublisher: Send + Sync {
    /// Publishes `message` with `subject` to `topic`
    ///
    /// # Returns
    ///
    /// The delivery identifier, if the service reported one
    async fn publish(&self, topic: &str, subject: &str, message: &str)
        -> PublishResult<Option<String>>;
}

/// `TopicPublisher` backed by the AWS SNS SDK
pub struct SnsPublisher {
    sns_client: Arc<SnsClient>,
}

impl SnsPublisher {
    /// Creates a new SNS publisher
    ///
    /// # Arguments
    ///
    /// * `sns_client` - Pre-configured SNS client
    #[must_use]
    pub const fn new(sns_client: Arc<SnsClient>) -> Self {
        Self { sns_client }
    }
}

#[async_trait]
impl TopicPublisher for SnsPublisher {
    async fn publish(
        &self,
        topic: &str,
        subject: &str,
        message: &str,
    ) -> PublishResult<Option<String>> {
        let result = self
            .sns_client
            .publish()
            .topic_arn(topic)
            .subject(subject)
            .message(message)
            .send()
            .await?;

        Ok(result.message_id().map(ToString::to_string))
    }
}
