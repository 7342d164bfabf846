use std::future::ready;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};
use common_kafka::KafkaBrokerClient;
use envconfig::Envconfig;
use tracing::level_filters::LevelFilter;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use ingest_consumer::committer::{AutoOffsetCommitter, KafkaOffsetCommitter, OffsetCommitter};
use ingest_consumer::config::Config;
use ingest_consumer::consumer::Consumer;
use ingest_consumer::filter::build_filter;
use ingest_consumer::instrumentation::MetricsInstrumentation;
use ingest_consumer::message::NormalizedMessage;
use ingest_consumer::metrics::{serve, setup_metrics_routes};
use ingest_consumer::worker::Worker;

fn setup_tracing() {
    let log_layer = tracing_subscriber::fmt::layer().with_filter(
        EnvFilter::builder()
            .with_default_directive(LevelFilter::INFO.into())
            .from_env_lossy()
            .add_directive("rdkafka=warn".parse().unwrap()),
    );
    tracing_subscriber::registry().with(log_layer).init();
}

pub async fn index() -> &'static str {
    "ingest consumer"
}

fn build_consumer(config: &Config) -> anyhow::Result<Consumer<KafkaBrokerClient>> {
    let client = KafkaBrokerClient::new(&config.kafka, &config.consumer)
        .context("Failed to create Kafka consumer")?;

    let committer: Arc<dyn OffsetCommitter> = if config.consumer.kafka_consumer_auto_commit {
        Arc::new(AutoOffsetCommitter)
    } else {
        Arc::new(KafkaOffsetCommitter::new(
            client.commit_handle(),
            config.consumer.kafka_consumer_async_commit,
        ))
    };
    let filter = build_filter(&config.filter).context("Invalid filter configuration")?;

    Ok(Consumer::new(
        client,
        config.poll_timeout.0,
        filter,
        committer,
        Arc::new(MetricsInstrumentation),
    ))
}

// Nothing downstream yet, consumed messages are only logged
fn log_messages(messages: &[NormalizedMessage]) -> anyhow::Result<()> {
    for message in messages {
        debug!(
            topic = message.topic(),
            partition = message.partition(),
            offset = message.offset(),
            key = message.key_as_str().unwrap_or("<binary>"),
            value = %String::from_utf8_lossy(message.value()),
            "Consumed message"
        );
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_tracing();
    info!("Starting ingest consumer...");

    let config = Config::init_from_env().context("Invalid configuration")?;
    info!(
        topics = config.consumer.kafka_consumer_topic,
        group_id = config.consumer.kafka_consumer_group,
        poll_timeout = ?config.poll_timeout.0,
        filter = %config.filter.filter_data_source,
        "Configuration loaded"
    );

    let bind = config.bind();
    let router = Router::new()
        .route("/", get(index))
        .route("/_readiness", get(index))
        .route("/_liveness", get(|| ready("ok")));
    let router = setup_metrics_routes(router).context("Failed to install metrics recorder")?;

    tokio::task::spawn(async move {
        serve(router, &bind)
            .await
            .expect("failed to start serving metrics");
    });

    let shutdown = Arc::new(AtomicBool::new(false));
    let signal = shutdown.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl+c");
        info!("Shutdown signal received");
        signal.store(true, Ordering::SeqCst);
    });

    let consumer = build_consumer(&config)?;
    let worker = Worker::new(consumer, shutdown);

    // The consumer blocks in poll, keep it off the async workers
    tokio::task::spawn_blocking(move || worker.run(log_messages))
        .await
        .context("Consumer loop panicked")??;

    info!("Ingest consumer shut down");
    Ok(())
}
