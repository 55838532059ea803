//! Notification dispatch
//!
//! Decides per notification whether to queue it on SQS or, when queuing is
//! switched off, publish it straight to the configured SNS topic. A failed
//! queue send is reported as a failure; it does not fall back to the topic.

mod config;
mod error;

use std::sync::Arc;

use chrono::Utc;

use crate::publish::TopicPublisher;
use crate::queue::{
    types::EMAIL_NOTIFICATION_MESSAGE_TYPE, EmailPayload, Notification, Priority, QueueEnvelope,
    TransportClient,
};

pub use config::{
    DispatchConfig, DEFAULT_DEAD_LETTER_QUEUE_NAME, DEFAULT_PRIMARY_QUEUE_NAME, DEFAULT_REGION,
};
pub use error::{DispatchError, DispatchResult};

/// Where a delivered notification went
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchReceipt {
    /// Written to a queue
    Queued {
        /// Queue name
        queue_name: String,
        /// SQS message ID
        message_id: String,
        /// ID of the envelope that was sent
        envelope_id: String,
    },
    /// Published straight to a topic
    Published {
        /// Topic ARN
        topic: String,
        /// SNS message ID
        message_id: String,
    },
}

/// Routes notifications to the queue or the fallback topic
pub struct DispatchService {
    config: DispatchConfig,
    transport: Arc<TransportClient>,
    publisher: Arc<dyn TopicPublisher>,
}

impl DispatchService {
    /// Creates a new dispatch service
    ///
    /// # Arguments
    ///
    /// * `config` - Enable flag, queue names and topic
    /// * `transport` - Queue client used for the primary queue
    /// * `publisher` - Topic publisher used for direct delivery
    #[must_use]
    pub fn new(
        config: DispatchConfig,
        transport: Arc<TransportClient>,
        publisher: Arc<dyn TopicPublisher>,
    ) -> Self {
        Self {
            config,
            transport,
            publisher,
        }
    }

    /// The configuration this service was built with
    #[must_use]
    pub const fn config(&self) -> &DispatchConfig {
        &self.config
    }

    /// The queue client
    #[must_use]
    pub fn transport(&self) -> &TransportClient {
        &self.transport
    }

    /// Queues a notification, or delivers it directly when queuing is disabled
    ///
    /// # Returns
    ///
    /// Whether the notification was accepted. The reason for a failure is
    /// logged, not returned.
    pub async fn queue_notification(
        &self,
        notification: &Notification,
        delay_seconds: i32,
        priority: Priority,
    ) -> bool {
        match self
            .try_queue_notification(notification, delay_seconds, priority)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    notification_type = %notification.notification_type,
                    queue_name = %self.config.primary_queue_name,
                    error = %e,
                    upstream = e.is_upstream_error(),
                    "Failed to dispatch notification"
                );
                false
            }
        }
    }

    /// Queues a notification, or delivers it directly when queuing is disabled
    ///
    /// # Returns
    ///
    /// A receipt naming the route taken
    ///
    /// # Errors
    ///
    /// Returns `DispatchError` describing why the notification was not accepted
    pub async fn try_queue_notification(
        &self,
        notification: &Notification,
        delay_seconds: i32,
        priority: Priority,
    ) -> DispatchResult<DispatchReceipt> {
        if !self.config.notifications_enabled {
            tracing::debug!("Queuing disabled, delivering notification directly");
            return self.try_send_direct(notification).await;
        }

        let envelope = QueueEnvelope::new(
            EMAIL_NOTIFICATION_MESSAGE_TYPE,
            EmailPayload {
                notification: notification.clone(),
                priority,
                queued_at: Utc::now(),
            },
        );
        let body = envelope.to_json()?;

        let queue_name = &self.config.primary_queue_name;
        let message_id = self
            .transport
            .try_send(queue_name, &body, delay_seconds)
            .await?;

        tracing::info!(
            queue_name = %queue_name,
            envelope_id = %envelope.id,
            message_id = %message_id,
            priority = %envelope.payload.priority,
            delay_seconds,
            "Notification queued"
        );

        Ok(DispatchReceipt::Queued {
            queue_name: queue_name.clone(),
            message_id,
            envelope_id: envelope.id,
        })
    }

    /// Publishes a notification's subject and message to the configured topic
    ///
    /// # Returns
    ///
    /// Whether the topic accepted it. Never fails; errors are logged.
    pub async fn send_direct(&self, notification: &Notification) -> bool {
        match self.try_send_direct(notification).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(
                    notification_type = %notification.notification_type,
                    error = %e,
                    upstream = e.is_upstream_error(),
                    "Failed to deliver notification directly"
                );
                false
            }
        }
    }

    /// Publishes a notification's subject and message to the configured topic
    ///
    /// # Errors
    ///
    /// Returns `DispatchError::TopicNotConfigured` without any remote call if
    /// no topic is set, or the publish failure otherwise
    pub async fn try_send_direct(
        &self,
        notification: &Notification,
    ) -> DispatchResult<DispatchReceipt> {
        let topic = self
            .config
            .topic_identifier
            .as_deref()
            .ok_or(DispatchError::TopicNotConfigured)?;

        let message_id = self
            .publisher
            .publish(topic, &notification.subject, &notification.message)
            .await?
            .ok_or_else(|| DispatchError::MissingDeliveryId(topic.to_string()))?;

        tracing::info!(topic, message_id = %message_id, "Notification published");

        Ok(DispatchReceipt::Published {
            topic: topic.to_string(),
            message_id,
        })
    }
}
