use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::queue::error::QueueResult;

/// Message type stamped on envelopes carrying an email notification
pub const EMAIL_NOTIFICATION_MESSAGE_TYPE: &str = "email_notification";

/// Default notification type when the caller does not set one
pub const DEFAULT_NOTIFICATION_TYPE: &str = "product_notification";

/// Retry budget recorded on new envelopes
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default visibility timeout for new queues (in seconds)
pub const DEFAULT_VISIBILITY_TIMEOUT_SECS: u32 = 30;

/// Default message retention for new queues: 14 days (in seconds)
pub const DEFAULT_RETENTION_SECS: u32 = 1_209_600;

/// Long-poll wait configured on new queues (in seconds)
pub const LONG_POLL_WAIT_SECS: u32 = 20;

/// Receive count after which SQS moves a message to the dead-letter queue
pub const REDRIVE_MAX_RECEIVE_COUNT: u32 = 3;

fn default_notification_type() -> String {
    DEFAULT_NOTIFICATION_TYPE.to_string()
}

const fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

/// Email notification handed to the dispatcher by a caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    /// Email address of the recipient
    pub recipient_email: String,
    /// Subject line
    pub subject: String,
    /// Message body
    pub message: String,
    /// Kind of notification, used by consumers to pick a template
    #[serde(default = "default_notification_type")]
    pub notification_type: String,
    /// Product fields for templating
    #[serde(default)]
    pub product_data: Option<Map<String, Value>>,
    /// User fields for templating
    #[serde(default)]
    pub user_data: Option<Map<String, Value>>,
}

impl Notification {
    /// Creates a notification with the default notification type and no extra data
    #[must_use]
    pub fn new(
        recipient_email: impl Into<String>,
        subject: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            recipient_email: recipient_email.into(),
            subject: subject.into(),
            message: message.into(),
            notification_type: default_notification_type(),
            product_data: None,
            user_data: None,
        }
    }

    /// Sets the notification type
    #[must_use]
    pub fn with_notification_type(mut self, notification_type: impl Into<String>) -> Self {
        self.notification_type = notification_type.into();
        self
    }

    /// Attaches product fields
    #[must_use]
    pub fn with_product_data(mut self, product_data: Map<String, Value>) -> Self {
        self.product_data = Some(product_data);
        self
    }

    /// Attaches user fields
    #[must_use]
    pub fn with_user_data(mut self, user_data: Map<String, Value>) -> Self {
        self.user_data = Some(user_data);
        self
    }
}

/// Priority recorded when the caller does not set one
pub const DEFAULT_PRIORITY: &str = "normal";

/// Delivery priority carried in the envelope payload
///
/// Any string is accepted and passed through unchanged, so envelopes from
/// other producers with their own priority names still parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(String);

impl Priority {
    /// Creates a priority with the given name
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The priority name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::new(DEFAULT_PRIORITY)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Priority {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for Priority {
    fn from(name: String) -> Self {
        Self(name)
    }
}

/// Payload of an `email_notification` envelope
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailPayload {
    /// The notification being delivered
    pub notification: Notification,
    /// Requested priority
    pub priority: Priority,
    /// When the dispatcher queued it
    pub queued_at: DateTime<Utc>,
}

/// Envelope written to the queue for every dispatch attempt
///
/// `retry_count` and `max_retries` are carried for downstream consumers and
/// are not enforced here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueueEnvelope<T = Value> {
    /// Unique envelope ID (UUID v4)
    pub id: String,
    /// Kind of payload, e.g. `email_notification`
    pub message_type: String,
    /// The payload
    pub payload: T,
    /// Number of delivery attempts made so far
    #[serde(default)]
    pub retry_count: u32,
    /// Maximum number of delivery attempts
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// When a consumer finished processing
    #[serde(default)]
    pub processed_at: Option<DateTime<Utc>>,
    /// Last processing error reported by a consumer
    #[serde(default)]
    pub error_message: Option<String>,
}

impl<T> QueueEnvelope<T> {
    /// Wraps a payload in a fresh envelope with a new ID and the current time
    #[must_use]
    pub fn new(message_type: impl Into<String>, payload: T) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            message_type: message_type.into(),
            payload,
            retry_count: 0,
            max_retries: DEFAULT_MAX_RETRIES,
            created_at: Utc::now(),
            processed_at: None,
            error_message: None,
        }
    }
}

impl<T: Serialize> QueueEnvelope<T> {
    /// Serializes the envelope to its JSON wire form
    ///
    /// # Errors
    ///
    /// Returns `QueueError::SerializationError` if the payload cannot be serialized
    pub fn to_json(&self) -> QueueResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Queue depth as reported by SQS
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct QueueStats {
    /// Queue name
    pub queue_name: String,
    /// Messages available for retrieval
    pub visible_messages: u64,
    /// Messages received but not yet deleted
    pub in_flight_messages: u64,
    /// Messages waiting out a delay
    pub delayed_messages: u64,
    /// Messages sitting in the dead-letter queue
    pub dead_letter_messages: u64,
    /// When the queue was created
    pub created_timestamp: Option<DateTime<Utc>>,
}

/// Raw message record returned by a receive call
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct ReceivedMessage {
    /// SQS message ID
    pub message_id: Option<String>,
    /// Receipt handle for deleting the message
    pub receipt_handle: Option<String>,
    /// Message body
    pub body: Option<String>,
    /// System attributes (`SentTimestamp`, `ApproximateReceiveCount`, ...)
    pub attributes: BTreeMap<String, String>,
    /// User message attributes with a string value
    pub message_attributes: BTreeMap<String, String>,
}

/// Attributes applied when a queue is created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueAttributes {
    /// Visibility timeout (in seconds)
    pub visibility_timeout_seconds: u32,
    /// Message retention period (in seconds)
    pub retention_seconds: u32,
    /// Long-poll wait for receives (in seconds)
    pub receive_wait_seconds: u32,
    /// ARN of the dead-letter queue, if messages should be redriven
    pub dead_letter_target_arn: Option<String>,
}

impl Default for QueueAttributes {
    fn default() -> Self {
        Self {
            visibility_timeout_seconds: DEFAULT_VISIBILITY_TIMEOUT_SECS,
            retention_seconds: DEFAULT_RETENTION_SECS,
            receive_wait_seconds: LONG_POLL_WAIT_SECS,
            dead_letter_target_arn: None,
        }
    }
}

impl QueueAttributes {
    /// Attributes with the given timeouts and the default long-poll wait
    #[must_use]
    pub fn new(visibility_timeout_seconds: u32, retention_seconds: u32) -> Self {
        Self {
            visibility_timeout_seconds,
            retention_seconds,
            ..Self::default()
        }
    }

    /// Redrives messages to the given dead-letter queue ARN
    #[must_use]
    pub fn with_dead_letter_target(mut self, arn: impl Into<String>) -> Self {
        self.dead_letter_target_arn = Some(arn.into());
        self
    }

    /// JSON redrive policy, present only when a dead-letter target is set
    #[must_use]
    pub fn redrive_policy(&self) -> Option<String> {
        self.dead_letter_target_arn.as_ref().map(|arn| {
            serde_json::json!({
                "deadLetterTargetArn": arn,
                "maxReceiveCount": REDRIVE_MAX_RECEIVE_COUNT,
            })
            .to_string()
        })
    }
}
