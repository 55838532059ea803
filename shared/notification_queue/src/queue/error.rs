use aws_sdk_sqs::error::SdkError;
use aws_sdk_sqs::operation::create_queue::CreateQueueError;
use aws_sdk_sqs::operation::get_queue_attributes::GetQueueAttributesError;
use aws_sdk_sqs::operation::get_queue_url::GetQueueUrlError;
use aws_sdk_sqs::operation::receive_message::ReceiveMessageError;
use aws_sdk_sqs::operation::send_message::SendMessageError;
use thiserror::Error;

/// Result type alias for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Error types for queue operations
#[derive(Error, Debug)]
pub enum QueueError {
    /// Error resolving a queue name to its URL
    #[error("Failed to resolve queue URL from SQS")]
    GetQueueUrl(#[from] SdkError<GetQueueUrlError>),

    /// Error creating a queue
    #[error("Failed to create queue in SQS")]
    CreateQueue(#[from] SdkError<CreateQueueError>),

    /// Error sending message to SQS
    #[error("Failed to send message to SQS")]
    SendMessage(#[from] SdkError<SendMessageError>),

    /// Error receiving messages from SQS
    #[error("Failed to receive messages from SQS")]
    ReceiveMessage(#[from] SdkError<ReceiveMessageError>),

    /// Error reading queue attributes
    #[error("Failed to read queue attributes from SQS")]
    GetQueueAttributes(#[from] SdkError<GetQueueAttributesError>),

    /// Error serializing message to JSON
    #[error("Failed to serialize message: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The queue name does not resolve to a queue
    #[error("Queue does not exist: {0}")]
    QueueNotFound(String),

    /// The service answered without a field we rely on
    #[error("Invalid response from SQS: {0}")]
    InvalidResponse(String),
}

impl QueueError {
    /// Checks if this error represents an upstream (5xx) error
    #[must_use]
    pub fn is_upstream_error(&self) -> bool {
        match self {
            Self::GetQueueUrl(sdk_err) => Self::check_sdk_error_status(sdk_err),
            Self::CreateQueue(sdk_err) => Self::check_sdk_error_status(sdk_err),
            Self::SendMessage(sdk_err) => Self::check_sdk_error_status(sdk_err),
            Self::ReceiveMessage(sdk_err) => Self::check_sdk_error_status(sdk_err),
            Self::GetQueueAttributes(sdk_err) => Self::check_sdk_error_status(sdk_err),
            Self::SerializationError(_) | Self::QueueNotFound(_) | Self::InvalidResponse(_) => {
                false
            }
        }
    }

    fn check_sdk_error_status<E>(sdk_err: &SdkError<E>) -> bool {
        if let SdkError::ServiceError(err) = sdk_err {
            return err.raw().status().as_u16() >= 500;
        }
        false
    }
}
