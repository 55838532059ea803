//! Queue operations for notification dispatch
//!
//! This module wraps AWS SQS: resolving queue names to URLs, creating queues
//! with an optional dead-letter redrive, and sending and receiving messages.

/// Cached queue client
pub mod client;
/// Queue name to URL cache
pub mod endpoint_cache;
/// Error types for queue operations
pub mod error;
/// Raw transport seam and its SQS implementation
pub mod transport;
/// Common types for queue operations
pub mod types;

pub use client::{TransportClient, DEFAULT_RECEIVE_WAIT_SECS, MAX_RECEIVE_BATCH};
pub use endpoint_cache::EndpointCache;
pub use error::{QueueError, QueueResult};
pub use transport::{QueueTransport, SqsTransport};
pub use types::{
    EmailPayload, Notification, Priority, QueueAttributes, QueueEnvelope, QueueStats,
    ReceivedMessage,
};
