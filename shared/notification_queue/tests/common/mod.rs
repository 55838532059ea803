//! In-memory transport and publisher fakes

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use aws_sdk_sqs::error::SdkError;
use notification_queue::publish::{PublishError, PublishResult, TopicPublisher};
use notification_queue::queue::{
    QueueAttributes, QueueError, QueueResult, QueueTransport, ReceivedMessage,
};

pub const TOPIC_ARN: &str = "arn:aws:sns:us-east-1:000000000000:notifications";

/// A message captured by the fake transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub queue_url: String,
    pub body: String,
    pub delay_seconds: i32,
}

/// A receive call captured by the fake transport
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiveRequest {
    pub queue_url: String,
    pub max_messages: i32,
    pub wait_seconds: i32,
}

/// Queue transport that keeps everything in memory and counts calls
#[derive(Default)]
pub struct FakeQueueTransport {
    queues: Mutex<HashMap<String, String>>,
    attributes: Mutex<HashMap<String, HashMap<String, String>>>,
    pending: Mutex<Vec<ReceivedMessage>>,
    pub lookups: AtomicUsize,
    pub created: Mutex<Vec<(String, QueueAttributes)>>,
    pub sent: Mutex<Vec<SentMessage>>,
    pub receives: Mutex<Vec<ReceiveRequest>>,
    pub fail_sends: AtomicBool,
    pub fail_lookups: AtomicBool,
}

impl FakeQueueTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Creates a fake that already has `queue_names`
    pub fn with_queues(queue_names: &[&str]) -> Arc<Self> {
        let fake = Self::new();
        for name in queue_names {
            fake.add_queue(name);
        }
        fake
    }

    pub fn url_for(queue_name: &str) -> String {
        format!("http://localhost:4566/000000000000/{queue_name}")
    }

    pub fn add_queue(&self, queue_name: &str) -> String {
        let url = Self::url_for(queue_name);
        self.queues
            .lock()
            .unwrap()
            .insert(queue_name.to_string(), url.clone());
        url
    }

    /// Simulates the queue being deleted out of band
    pub fn delete_queue(&self, queue_name: &str) {
        self.queues.lock().unwrap().remove(queue_name);
    }

    /// Simulates the queue being recreated out of band under a new URL
    pub fn recreate_queue(&self, queue_name: &str) -> String {
        let url = format!("{}-recreated", Self::url_for(queue_name));
        self.queues
            .lock()
            .unwrap()
            .insert(queue_name.to_string(), url.clone());
        url
    }

    pub fn set_attributes(&self, queue_name: &str, attributes: &[(&str, &str)]) {
        self.attributes.lock().unwrap().insert(
            Self::url_for(queue_name),
            attributes
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        );
    }

    pub fn push_pending(&self, message: ReceivedMessage) {
        self.pending.lock().unwrap().push(message);
    }

    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }

    pub fn sent_messages(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn created_queues(&self) -> Vec<(String, QueueAttributes)> {
        self.created.lock().unwrap().clone()
    }

    pub fn receive_requests(&self) -> Vec<ReceiveRequest> {
        self.receives.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueueTransport for FakeQueueTransport {
    async fn get_queue_url(&self, queue_name: &str) -> QueueResult<Option<String>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(QueueError::GetQueueUrl(SdkError::timeout_error(
                "lookup timed out",
            )));
        }
        Ok(self.queues.lock().unwrap().get(queue_name).cloned())
    }

    async fn create_queue(
        &self,
        queue_name: &str,
        attributes: &QueueAttributes,
    ) -> QueueResult<String> {
        self.created
            .lock()
            .unwrap()
            .push((queue_name.to_string(), attributes.clone()));
        Ok(self.add_queue(queue_name))
    }

    async fn send_message(
        &self,
        queue_url: &str,
        body: &str,
        delay_seconds: i32,
    ) -> QueueResult<String> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(QueueError::SendMessage(SdkError::timeout_error(
                "send timed out",
            )));
        }
        let live = self
            .queues
            .lock()
            .unwrap()
            .values()
            .any(|url| url == queue_url);
        if !live {
            return Err(QueueError::InvalidResponse(format!(
                "no queue at {queue_url}"
            )));
        }

        let mut sent = self.sent.lock().unwrap();
        sent.push(SentMessage {
            queue_url: queue_url.to_string(),
            body: body.to_string(),
            delay_seconds,
        });
        Ok(format!("msg-{}", sent.len()))
    }

    async fn receive_messages(
        &self,
        queue_url: &str,
        max_messages: i32,
        wait_seconds: i32,
    ) -> QueueResult<Vec<ReceivedMessage>> {
        self.receives.lock().unwrap().push(ReceiveRequest {
            queue_url: queue_url.to_string(),
            max_messages,
            wait_seconds,
        });

        let mut pending = self.pending.lock().unwrap();
        let take = usize::try_from(max_messages).unwrap().min(pending.len());
        Ok(pending.drain(..take).collect())
    }

    async fn get_queue_attributes(
        &self,
        queue_url: &str,
    ) -> QueueResult<HashMap<String, String>> {
        Ok(self
            .attributes
            .lock()
            .unwrap()
            .get(queue_url)
            .cloned()
            .unwrap_or_default())
    }
}

/// How the fake publisher answers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishBehavior {
    Deliver,
    NoMessageId,
    Fail,
}

/// Topic publisher that records every call
pub struct FakeTopicPublisher {
    behavior: PublishBehavior,
    pub calls: Mutex<Vec<(String, String, String)>>,
}

impl FakeTopicPublisher {
    pub fn new(behavior: PublishBehavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(String, String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl TopicPublisher for FakeTopicPublisher {
    async fn publish(
        &self,
        topic: &str,
        subject: &str,
        message: &str,
    ) -> PublishResult<Option<String>> {
        self.calls.lock().unwrap().push((
            topic.to_string(),
            subject.to_string(),
            message.to_string(),
        ));

        match self.behavior {
            PublishBehavior::Deliver => Ok(Some("sns-message-1".to_string())),
            PublishBehavior::NoMessageId => Ok(None),
            PublishBehavior::Fail => Err(PublishError::Publish(
                aws_sdk_sns::error::SdkError::timeout_error("publish timed out"),
            )),
        }
    }
}
