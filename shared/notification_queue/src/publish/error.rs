use aws_sdk_sns::error::SdkError;
use aws_sdk_sns::operation::publish::PublishError as SnsPublishError;
use thiserror::Error;

/// Result type alias for topic publish operations
pub type PublishResult<T> = Result<T, PublishError>;

/// Error types for topic publish operations
#[derive(Error, Debug)]
pub enum PublishError {
    /// Error publishing to SNS
    #[error("Failed to publish message to SNS")]
    Publish(#[from] SdkError<SnsPublishError>),
}

impl PublishError {
    /// Checks if this error represents an upstream (5xx) error
    #[must_use]
    pub fn is_upstream_error(&self) -> bool {
        match self {
            Self::Publish(SdkError::ServiceError(err)) => err.raw().status().as_u16() >= 500,
            Self::Publish(_) => false,
        }
    }
}
