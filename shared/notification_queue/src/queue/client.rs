//! Cached queue client
//!
//! Resolves queue names to URLs once, then sends and receives against the
//! cached URL.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::queue::{
    endpoint_cache::EndpointCache,
    error::{QueueError, QueueResult},
    transport::QueueTransport,
    types::{QueueAttributes, QueueStats, ReceivedMessage},
};

/// Largest batch SQS will return from a single receive
pub const MAX_RECEIVE_BATCH: i32 = 10;

/// Long-poll wait callers use for receives unless they need a shorter one
pub const DEFAULT_RECEIVE_WAIT_SECS: i32 = 20;

/// Queue client that caches name-to-URL resolution
pub struct TransportClient {
    transport: Arc<dyn QueueTransport>,
    endpoints: EndpointCache,
}

impl TransportClient {
    /// Creates a client whose resolved URLs are cached for the process lifetime
    #[must_use]
    pub fn new(transport: Arc<dyn QueueTransport>) -> Self {
        Self::with_cache(transport, EndpointCache::new())
    }

    /// Creates a client using the given endpoint cache
    #[must_use]
    pub const fn with_cache(transport: Arc<dyn QueueTransport>, endpoints: EndpointCache) -> Self {
        Self {
            transport,
            endpoints,
        }
    }

    /// The endpoint cache, for invalidating stale entries
    #[must_use]
    pub const fn endpoints(&self) -> &EndpointCache {
        &self.endpoints
    }

    /// Resolves a queue name to its URL
    ///
    /// # Returns
    ///
    /// `None` if the queue does not exist. Missing queues are not cached.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` for any lookup failure other than a missing queue
    pub async fn resolve_endpoint(&self, queue_name: &str) -> QueueResult<Option<String>> {
        if let Some(url) = self.endpoints.get(queue_name) {
            return Ok(Some(url));
        }

        let url = self.transport.get_queue_url(queue_name).await?;
        match &url {
            Some(url) => self.endpoints.insert(queue_name, url),
            None => tracing::debug!(queue_name, "Queue does not exist"),
        }

        Ok(url)
    }

    /// Returns the URL of `queue_name`, creating the queue if it does not exist
    ///
    /// An existing queue is returned as is; its attributes are not updated.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if resolution or creation fails
    pub async fn ensure_queue(
        &self,
        queue_name: &str,
        attributes: &QueueAttributes,
    ) -> QueueResult<String> {
        if let Some(url) = self.resolve_endpoint(queue_name).await? {
            tracing::debug!(queue_name, queue_url = %url, "Queue already exists");
            return Ok(url);
        }

        let url = self.transport.create_queue(queue_name, attributes).await?;
        tracing::info!(
            queue_name,
            queue_url = %url,
            dead_letter_target = ?attributes.dead_letter_target_arn,
            "Created queue"
        );
        self.endpoints.insert(queue_name, &url);

        Ok(url)
    }

    /// Sends `body` to `queue_name`
    ///
    /// # Returns
    ///
    /// The SQS message ID
    ///
    /// # Errors
    ///
    /// Returns `QueueError::QueueNotFound` if the queue does not exist, or the
    /// underlying error if resolution or the send fails
    pub async fn try_send(
        &self,
        queue_name: &str,
        body: &str,
        delay_seconds: i32,
    ) -> QueueResult<String> {
        let url = self
            .resolve_endpoint(queue_name)
            .await?
            .ok_or_else(|| QueueError::QueueNotFound(queue_name.to_string()))?;

        self.transport
            .send_message(&url, body, delay_seconds)
            .await
    }

    /// Sends `body` to `queue_name`, reporting whether it was accepted
    ///
    /// A missing queue or a rejected send is logged and reported as
    /// `Ok(false)`. Sends are never retried.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if the queue name cannot be resolved for any
    /// reason other than the queue not existing
    pub async fn send(
        &self,
        queue_name: &str,
        body: &str,
        delay_seconds: i32,
    ) -> QueueResult<bool> {
        let Some(url) = self.resolve_endpoint(queue_name).await? else {
            tracing::warn!(queue_name, "Queue does not exist, message not sent");
            return Ok(false);
        };

        match self.transport.send_message(&url, body, delay_seconds).await {
            Ok(message_id) => {
                tracing::debug!(queue_name, message_id = %message_id, "Message sent");
                Ok(true)
            }
            Err(e) => {
                tracing::warn!(
                    queue_name,
                    error = %e,
                    upstream = e.is_upstream_error(),
                    "Failed to send message"
                );
                Ok(false)
            }
        }
    }

    /// Receives raw messages from `queue_name`
    ///
    /// `max_messages` is clamped to `1..=10`. The call long-polls for up to
    /// `wait_seconds`. Messages are left on the queue.
    ///
    /// # Returns
    ///
    /// An empty vector if the queue does not exist
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if resolution or the receive fails
    pub async fn receive(
        &self,
        queue_name: &str,
        max_messages: i32,
        wait_seconds: i32,
    ) -> QueueResult<Vec<ReceivedMessage>> {
        let Some(url) = self.resolve_endpoint(queue_name).await? else {
            return Ok(Vec::new());
        };

        let messages = self
            .transport
            .receive_messages(&url, max_messages.clamp(1, MAX_RECEIVE_BATCH), wait_seconds)
            .await?;
        tracing::debug!(queue_name, count = messages.len(), "Received messages");

        Ok(messages)
    }

    /// Looks up the ARN of `queue_name`
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if resolution or the attribute read fails
    pub async fn queue_arn(&self, queue_name: &str) -> QueueResult<Option<String>> {
        let Some(url) = self.resolve_endpoint(queue_name).await? else {
            return Ok(None);
        };

        let attributes = self.transport.get_queue_attributes(&url).await?;
        attributes
            .get("QueueArn")
            .cloned()
            .map(Some)
            .ok_or_else(|| QueueError::InvalidResponse(format!("No QueueArn for {queue_name}")))
    }

    /// Reads approximate message counts for `queue_name`
    ///
    /// When `dead_letter_queue` names an existing queue, its visible count is
    /// reported as `dead_letter_messages`.
    ///
    /// # Errors
    ///
    /// Returns `QueueError` if resolution or an attribute read fails
    pub async fn queue_stats(
        &self,
        queue_name: &str,
        dead_letter_queue: Option<&str>,
    ) -> QueueResult<Option<QueueStats>> {
        let Some(url) = self.resolve_endpoint(queue_name).await? else {
            return Ok(None);
        };
        let attributes = self.transport.get_queue_attributes(&url).await?;

        let mut dead_letter_messages = 0;
        if let Some(dlq_name) = dead_letter_queue {
            if let Some(dlq_url) = self.resolve_endpoint(dlq_name).await? {
                let dlq_attributes = self.transport.get_queue_attributes(&dlq_url).await?;
                dead_letter_messages = count(&dlq_attributes, "ApproximateNumberOfMessages");
            }
        }

        Ok(Some(QueueStats {
            queue_name: queue_name.to_string(),
            visible_messages: count(&attributes, "ApproximateNumberOfMessages"),
            in_flight_messages: count(&attributes, "ApproximateNumberOfMessagesNotVisible"),
            delayed_messages: count(&attributes, "ApproximateNumberOfMessagesDelayed"),
            dead_letter_messages,
            created_timestamp: attributes
                .get("CreatedTimestamp")
                .and_then(|secs| secs.parse::<i64>().ok())
                .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0)),
        }))
    }
}

fn count(attributes: &HashMap<String, String>, name: &str) -> u64 {
    attributes
        .get(name)
        .and_then(|value| value.parse().ok())
        .unwrap_or(0)
}
