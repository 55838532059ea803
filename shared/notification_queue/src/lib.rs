//! Notification dispatch over AWS SQS with an SNS fallback
//!
//! This crate queues email notifications onto an SQS queue and, when queuing
//! is switched off, publishes them straight to an SNS topic instead.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, dead_code)]

pub mod dispatch;
pub mod publish;
pub mod queue;

pub use dispatch::{DispatchConfig, DispatchError, DispatchReceipt, DispatchService};
pub use publish::{PublishError, SnsPublisher, TopicPublisher};
pub use queue::{
    EmailPayload, EndpointCache, Notification, Priority, QueueAttributes, QueueEnvelope,
    QueueError, QueueResult, QueueStats, QueueTransport, ReceivedMessage, SqsTransport,
    TransportClient,
};
