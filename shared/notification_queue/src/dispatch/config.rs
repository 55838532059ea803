//! Dispatch configuration

use std::env;

/// Queue notifications go to unless overridden
pub const DEFAULT_PRIMARY_QUEUE_NAME: &str = "notification-processing-queue";

/// Dead-letter queue paired with the primary queue unless overridden
pub const DEFAULT_DEAD_LETTER_QUEUE_NAME: &str = "notification-dead-letter-queue";

/// AWS region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

/// Settings for a [`DispatchService`], fixed at construction
///
/// [`DispatchService`]: crate::dispatch::DispatchService
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    /// Queue notifications; when false, publish them straight to the topic
    pub notifications_enabled: bool,
    /// Queue that receives notification envelopes
    pub primary_queue_name: String,
    /// Dead-letter queue for the primary queue, used when provisioning
    pub dead_letter_queue_name: String,
    /// AWS region for the SQS and SNS clients
    pub region: String,
    /// SNS topic ARN for direct delivery
    pub topic_identifier: Option<String>,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            notifications_enabled: true,
            primary_queue_name: DEFAULT_PRIMARY_QUEUE_NAME.to_string(),
            dead_letter_queue_name: DEFAULT_DEAD_LETTER_QUEUE_NAME.to_string(),
            region: DEFAULT_REGION.to_string(),
            topic_identifier: None,
        }
    }
}

impl DispatchConfig {
    /// Reads the configuration from environment variables
    ///
    /// * `SQS_ENABLE_NOTIFICATIONS` - queuing is on unless this is set to something other than `true`
    /// * `AWS_SQS_QUEUE_NAME` - primary queue name
    /// * `AWS_SQS_DLQ_NAME` - dead-letter queue name
    /// * `AWS_REGION` - AWS region
    /// * `AWS_SNS_TOPIC_ARN` - topic for direct delivery; empty counts as unset
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            notifications_enabled: env::var("SQS_ENABLE_NOTIFICATIONS")
                .map_or(defaults.notifications_enabled, |v| {
                    v.trim().eq_ignore_ascii_case("true")
                }),
            primary_queue_name: env::var("AWS_SQS_QUEUE_NAME")
                .unwrap_or(defaults.primary_queue_name),
            dead_letter_queue_name: env::var("AWS_SQS_DLQ_NAME")
                .unwrap_or(defaults.dead_letter_queue_name),
            region: env::var("AWS_REGION").unwrap_or(defaults.region),
            topic_identifier: env::var("AWS_SNS_TOPIC_ARN")
                .ok()
                .filter(|arn| !arn.trim().is_empty()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;

    const VARS: [&str; 5] = [
        "SQS_ENABLE_NOTIFICATIONS",
        "AWS_SQS_QUEUE_NAME",
        "AWS_SQS_DLQ_NAME",
        "AWS_REGION",
        "AWS_SNS_TOPIC_ARN",
    ];

    fn clear_vars() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_env() {
        clear_vars();

        assert_eq!(DispatchConfig::from_env(), DispatchConfig::default());
        assert!(DispatchConfig::default().notifications_enabled);
        assert_eq!(
            DispatchConfig::default().primary_queue_name,
            "notification-processing-queue"
        );
    }

    #[test]
    #[serial]
    fn test_reads_env_overrides() {
        clear_vars();
        env::set_var("SQS_ENABLE_NOTIFICATIONS", "FALSE");
        env::set_var("AWS_SQS_QUEUE_NAME", "orders");
        env::set_var("AWS_SQS_DLQ_NAME", "orders-dlq");
        env::set_var("AWS_REGION", "eu-west-1");
        env::set_var("AWS_SNS_TOPIC_ARN", "arn:aws:sns:eu-west-1:000000000000:emails");

        let config = DispatchConfig::from_env();
        assert_eq!(
            config,
            DispatchConfig {
                notifications_enabled: false,
                primary_queue_name: "orders".to_string(),
                dead_letter_queue_name: "orders-dlq".to_string(),
                region: "eu-west-1".to_string(),
                topic_identifier: Some("arn:aws:sns:eu-west-1:000000000000:emails".to_string()),
            }
        );

        clear_vars();
    }

    #[test]
    #[serial]
    fn test_enable_flag_parsing() {
        clear_vars();

        env::set_var("SQS_ENABLE_NOTIFICATIONS", "True");
        assert!(DispatchConfig::from_env().notifications_enabled);

        env::set_var("SQS_ENABLE_NOTIFICATIONS", "1");
        assert!(!DispatchConfig::from_env().notifications_enabled);

        clear_vars();
    }

    #[test]
    #[serial]
    fn test_empty_topic_is_unset() {
        clear_vars();
        env::set_var("AWS_SNS_TOPIC_ARN", "  ");

        assert_eq!(DispatchConfig::from_env().topic_identifier, None);

        clear_vars();
    }
}
