//! Raw SQS operations
//!
//! `QueueTransport` is the seam between the cached [`TransportClient`] and the
//! managed queue service. `SqsTransport` is the AWS implementation.
//!
//! [`TransportClient`]: crate::queue::TransportClient

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_sqs::error::SdkError;
use aws_sdk_sqs::types::{Message, MessageSystemAttributeName, QueueAttributeName};
use aws_sdk_sqs::Client as SqsClient;

use crate::queue::{
    error::{QueueError, QueueResult},
    types::{QueueAttributes, ReceivedMessage},
};

/// Remote queue operations, one call per method and no caching
#[async_trait]
pub trait QueueTransport: Send + Sync {
    /// Looks up the URL of `queue_name`, returning `None` if the queue does not exist
    async fn get_queue_url(&self, queue_name: &str) -> QueueResult<Option<String>>;

    /// Creates `queue_name` with `attributes` and returns its URL
    async fn create_queue(
        &self,
        queue_name: &str,
        attributes: &QueueAttributes,
    ) -> QueueResult<String>;

    /// Sends `body` to the queue at `queue_url` and returns the message ID
    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        delay_seconds: i32,
    ) -> QueueResult<String>;

    /// Receives up to `max_messages`, waiting up to `wait_seconds` for one to arrive
    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_seconds: i32,
    ) -> QueueResult<Vec<ReceivedMessage>>;

    /// Reads every attribute of the queue at `queue_url`
    async fn get_queue_attributes(&self, queue_url: &str)
        -> QueueResult<HashMap<String, String>>;
}

/// `QueueTransport` backed by the AWS SQS SDK
pub struct SqsTransport {
    sqs_client: Arc<SqsClient>,
}

impl SqsTransport {
    /// Creates a new SQS transport
    ///
    /// # Arguments
    ///
    /// * `sqs_client` - Pre-configured SQS client
    #[must_use]
    pub const fn new(sqs_client: Arc<SqsClient>) -> Self {
        Self { sqs_client }
    }
}

#[async_trait]
impl QueueTransport for SqsTransport {
    async fn get_queue_url(&self, queue_name: &str) -> QueueResult<Option<String>> {
        match self
            .sqs_client
            .get_queue_url()
            .queue_name(queue_name)
            .send()
            .await
        {
            Ok(output) => output
                .queue_url()
                .map(|url| Some(url.to_string()))
                .ok_or_else(|| {
                    QueueError::InvalidResponse("GetQueueUrl returned no queue URL".to_string())
                }),
            Err(SdkError::ServiceError(ref svc)) if svc.err().is_queue_does_not_exist() => {
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn create_queue(
        &self,
        queue_name: &str,
        attributes: &QueueAttributes,
    ) -> QueueResult<String> {
        let output = self
            .sqs_client
            .create_queue()
            .queue_name(queue_name)
            .set_attributes(Some(creation_attributes(attributes)))
            .send()
            .await?;

        output
            .queue_url()
            .map(ToString::to_string)
            .ok_or_else(|| QueueError::InvalidResponse("CreateQueue returned no queue URL".into()))
    }

    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        delay_seconds: i32,
    ) -> QueueResult<String> {
        let result = self
            .sqs_client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .delay_seconds(delay_seconds)
            .send()
            .await?;

        Ok(result
            .message_id()
            .map(std::string::ToString::to_string)
            .unwrap_or_default())
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_seconds: i32,
    ) -> QueueResult<Vec<ReceivedMessage>> {
        let result = self
            .sqs_client
            .receive_message()
            .queue_url(queue_url)
            .max_number_of_messages(max_messages)
            .wait_time_seconds(wait_seconds)
            .message_attribute_names("All")
            .message_system_attribute_names(MessageSystemAttributeName::All)
            .send()
            .await?;

        Ok(result.messages().iter().map(to_received_message).collect())
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
    ) -> QueueResult<HashMap<String, String>> {
        let result = self
            .sqs_client
            .get_queue_attributes()
            .queue_url(queue_url)
            .attribute_names(QueueAttributeName::All)
            .send()
            .await?;

        Ok(result
            .attributes()
            .map(|attributes| {
                attributes
                    .iter()
                    .map(|(name, value)| (name.as_str().to_string(), value.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// SQS attribute map for a `CreateQueue` call
fn creation_attributes(attributes: &QueueAttributes) -> HashMap<QueueAttributeName, String> {
    let mut mapped = HashMap::from([
        (
            QueueAttributeName::VisibilityTimeout,
            attributes.visibility_timeout_seconds.to_string(),
        ),
        (
            QueueAttributeName::MessageRetentionPeriod,
            attributes.retention_seconds.to_string(),
        ),
        (
            QueueAttributeName::ReceiveMessageWaitTimeSeconds,
            attributes.receive_wait_seconds.to_string(),
        ),
    ]);
    if let Some(policy) = attributes.redrive_policy() {
        mapped.insert(QueueAttributeName::RedrivePolicy, policy);
    }
    mapped
}

fn to_received_message(msg: &Message) -> ReceivedMessage {
    let attributes: BTreeMap<String, String> = msg
        .attributes()
        .map(|attributes| {
            attributes
                .iter()
                .map(|(name, value)| (name.as_str().to_string(), value.clone()))
                .collect()
        })
        .unwrap_or_default();

    // Binary-valued attributes have no string form and are skipped
    let message_attributes: BTreeMap<String, String> = msg
        .message_attributes()
        .map(|attributes| {
            attributes
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .string_value()
                        .map(|value| (name.clone(), value.to_string()))
                })
                .collect()
        })
        .unwrap_or_default();

    ReceivedMessage {
        message_id: msg.message_id().map(ToString::to_string),
        receipt_handle: msg.receipt_handle().map(ToString::to_string),
        body: msg.body().map(ToString::to_string),
        attributes,
        message_attributes,
    }
}
