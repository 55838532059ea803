use std::sync::Arc;

use aws_sdk_sns::Client as SnsClient;
use aws_sdk_sqs::Client as SqsClient;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use dispatcher::cli::{self, Cli};
use dispatcher::types::Environment;
use notification_queue::{
    DispatchConfig, DispatchService, SnsPublisher, SqsTransport, TransportClient,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Local overrides for development; absent in deployed environments.
    // Loaded before parsing so DISPATCH_* flags can come from .env
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let environment = Environment::from_env();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    // Use JSON format for staging/production, regular format for development
    if environment.json_logs() {
        fmt().json().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).init();
    }

    let config = DispatchConfig::from_env();
    tracing::debug!(?environment, ?config, "Loaded configuration");

    let aws_config = environment.aws_config(&config.region).await;
    let transport = Arc::new(TransportClient::new(Arc::new(SqsTransport::new(Arc::new(
        SqsClient::new(&aws_config),
    )))));
    let publisher = Arc::new(SnsPublisher::new(Arc::new(SnsClient::new(&aws_config))));
    let service = DispatchService::new(config, transport, publisher);

    cli::run(cli.command, &service).await
}
