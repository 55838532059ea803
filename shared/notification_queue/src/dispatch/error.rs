use thiserror::Error;

use crate::publish::PublishError;
use crate::queue::QueueError;

/// Result type alias for dispatch operations
pub type DispatchResult<T> = Result<T, DispatchError>;

/// Why a notification was not delivered
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The primary queue does not exist
    #[error("Queue does not exist: {0}")]
    QueueUnavailable(String),

    /// The queue rejected the message or could not be reached
    #[error(transparent)]
    Queue(QueueError),

    /// The envelope could not be serialized
    #[error("Failed to serialize envelope: {0}")]
    Serialization(serde_json::Error),

    /// Direct delivery was needed but no topic is configured
    #[error("No topic configured for direct delivery")]
    TopicNotConfigured,

    /// The topic rejected the message or could not be reached
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// The topic accepted the call but reported no delivery identifier
    #[error("Publish to {0} returned no message ID")]
    MissingDeliveryId(String),
}

impl DispatchError {
    /// Checks if the queue or topic service answered with a 5xx
    #[must_use]
    pub fn is_upstream_error(&self) -> bool {
        match self {
            Self::Queue(e) => e.is_upstream_error(),
            Self::Publish(e) => e.is_upstream_error(),
            Self::QueueUnavailable(_)
            | Self::Serialization(_)
            | Self::TopicNotConfigured
            | Self::MissingDeliveryId(_) => false,
        }
    }
}

impl From<QueueError> for DispatchError {
    fn from(err: QueueError) -> Self {
        match err {
            QueueError::QueueNotFound(queue_name) => Self::QueueUnavailable(queue_name),
            QueueError::SerializationError(e) => Self::Serialization(e),
            other => Self::Queue(other),
        }
    }
}
