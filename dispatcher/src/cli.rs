//! Command line interface for dispatching and provisioning

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use notification_queue::queue::types::{
    DEFAULT_NOTIFICATION_TYPE, DEFAULT_PRIORITY, DEFAULT_RETENTION_SECS,
    DEFAULT_VISIBILITY_TIMEOUT_SECS,
};
use notification_queue::queue::DEFAULT_RECEIVE_WAIT_SECS;
use notification_queue::{DispatchService, Notification, Priority, QueueAttributes};
use serde_json::{Map, Value};
use tracing::info;

/// Queue email notifications on SQS, with direct SNS delivery as a fallback
#[derive(Debug, Parser)]
#[command(name = "dispatcher", version)]
pub struct Cli {
    /// Operation to run
    #[command(subcommand)]
    pub command: Command,
}

/// Dispatcher operations
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Queue a notification, or publish it directly when queuing is disabled
    Send(SendArgs),
    /// Publish a notification straight to the configured topic
    SendDirect(NotificationArgs),
    /// Create the dead-letter queue and the primary queue redriving into it
    Provision(ProvisionArgs),
    /// Print message counts for the primary queue
    Stats,
    /// Print messages waiting on the primary queue without deleting them
    Peek(PeekArgs),
}

/// Fields of the notification to send
#[derive(Debug, Args)]
pub struct NotificationArgs {
    /// Recipient email address
    #[arg(long, env = "DISPATCH_TO")]
    pub to: String,
    /// Subject line
    #[arg(long, env = "DISPATCH_SUBJECT")]
    pub subject: String,
    /// Message body
    #[arg(long, env = "DISPATCH_MESSAGE")]
    pub message: String,
    /// Notification type
    #[arg(long, env = "DISPATCH_NOTIFICATION_TYPE", default_value = DEFAULT_NOTIFICATION_TYPE)]
    pub notification_type: String,
    /// Product fields as a JSON object
    #[arg(long, env = "DISPATCH_PRODUCT_DATA", value_parser = parse_json_object)]
    pub product_data: Option<Map<String, Value>>,
    /// User fields as a JSON object
    #[arg(long, env = "DISPATCH_USER_DATA", value_parser = parse_json_object)]
    pub user_data: Option<Map<String, Value>>,
}

impl NotificationArgs {
    /// Builds the notification described by the arguments
    #[must_use]
    pub fn into_notification(self) -> Notification {
        let mut notification = Notification::new(self.to, self.subject, self.message)
            .with_notification_type(self.notification_type);
        notification.product_data = self.product_data;
        notification.user_data = self.user_data;
        notification
    }
}

/// Arguments for `send`
#[derive(Debug, Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub notification: NotificationArgs,
    /// Seconds SQS holds the message before it becomes visible
    #[arg(
        long,
        env = "DISPATCH_DELAY_SECONDS",
        default_value_t = 0,
        value_parser = clap::value_parser!(i32).range(0..=900)
    )]
    pub delay_seconds: i32,
    /// Delivery priority label, passed through to the consumer as given
    #[arg(long, env = "DISPATCH_PRIORITY", default_value = DEFAULT_PRIORITY)]
    pub priority: Priority,
}

/// Arguments for `provision`
#[derive(Debug, Args)]
pub struct ProvisionArgs {
    /// Visibility timeout for both queues (in seconds)
    #[arg(
        long,
        env = "DISPATCH_VISIBILITY_TIMEOUT",
        default_value_t = DEFAULT_VISIBILITY_TIMEOUT_SECS
    )]
    pub visibility_timeout: u32,
    /// Message retention for both queues (in seconds)
    #[arg(long, env = "DISPATCH_RETENTION", default_value_t = DEFAULT_RETENTION_SECS)]
    pub retention: u32,
}

/// Arguments for `peek`
#[derive(Debug, Args)]
pub struct PeekArgs {
    /// Maximum messages to fetch, clamped to 1..=10
    #[arg(long, env = "DISPATCH_MAX_MESSAGES", default_value_t = 1)]
    pub max_messages: i32,
    /// Long-poll wait (in seconds)
    #[arg(long, env = "DISPATCH_WAIT_SECONDS", default_value_t = DEFAULT_RECEIVE_WAIT_SECS)]
    pub wait_seconds: i32,
}

fn parse_json_object(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}

/// Runs `command` against `service`
///
/// # Errors
///
/// Returns an error if a notification is not accepted or a queue operation fails
pub async fn run(command: Command, service: &DispatchService) -> anyhow::Result<()> {
    match command {
        Command::Send(args) => {
            let notification = args.notification.into_notification();
            if !service
                .queue_notification(&notification, args.delay_seconds, args.priority)
                .await
            {
                bail!("Notification was not dispatched");
            }
            info!("Notification dispatched");
        }
        Command::SendDirect(args) => {
            if !service.send_direct(&args.into_notification()).await {
                bail!("Notification was not published");
            }
            info!("Notification published");
        }
        Command::Provision(args) => provision(service, &args).await?,
        Command::Stats => {
            let config = service.config();
            let stats = service
                .transport()
                .queue_stats(
                    &config.primary_queue_name,
                    Some(&config.dead_letter_queue_name),
                )
                .await?
                .with_context(|| format!("Queue {} does not exist", config.primary_queue_name))?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Command::Peek(args) => {
            let messages = service
                .transport()
                .receive(
                    &service.config().primary_queue_name,
                    args.max_messages,
                    args.wait_seconds,
                )
                .await?;
            println!("{}", serde_json::to_string_pretty(&messages)?);
        }
    }

    Ok(())
}

async fn provision(service: &DispatchService, args: &ProvisionArgs) -> anyhow::Result<()> {
    let config = service.config();
    let transport = service.transport();
    let attributes = QueueAttributes::new(args.visibility_timeout, args.retention);

    transport
        .ensure_queue(&config.dead_letter_queue_name, &attributes)
        .await?;
    let dlq_arn = transport
        .queue_arn(&config.dead_letter_queue_name)
        .await?
        .with_context(|| {
            format!(
                "Dead-letter queue {} vanished after creation",
                config.dead_letter_queue_name
            )
        })?;

    let queue_url = transport
        .ensure_queue(
            &config.primary_queue_name,
            &attributes.with_dead_letter_target(dlq_arn),
        )
        .await?;
    info!(queue_url = %queue_url, "Queues provisioned");

    Ok(())
}
