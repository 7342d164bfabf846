use std::sync::{Arc, Weak};
use std::time::Duration;

use rdkafka::{
    consumer::{BaseConsumer, CommitMode, Consumer},
    error::KafkaError,
    ClientConfig, Offset, TopicPartitionList,
};
use tracing::{debug, info, warn};

use crate::config::{ConsumerConfig, KafkaConfig};
use crate::context::KafkaConsumerContext;
use crate::record::{OffsetMap, RawRecord, RecordBatch};

/// The broker-facing half of a consumer: hands out batches of raw records and
/// releases its connection when closed.
///
/// Implementations are driven from a single thread; `close` consumes the client
/// so it can only ever run once.
pub trait BrokerClient {
    /// Wait up to `timeout` for records. An empty batch is not an error.
    fn poll(&mut self, timeout: Duration) -> Result<RecordBatch, PollErr>;

    fn close(self) -> Result<(), CloseErr>
    where
        Self: Sized;
}

#[derive(Debug, thiserror::Error)]
pub enum PollErr {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),
}

#[derive(Debug, thiserror::Error)]
pub enum CloseErr {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),
    #[error("Consumer still referenced by a commit handle")]
    InUse,
}

#[derive(Debug, thiserror::Error)]
pub enum OffsetErr {
    #[error("Kafka error: {0}")]
    Kafka(#[from] KafkaError),
    #[error("Consumer gone")]
    Gone,
}

type Inner = BaseConsumer<KafkaConsumerContext>;

pub struct KafkaBrokerClient {
    consumer: Arc<Inner>,
    max_poll_records: usize,
    // Error seen after records were already taken from the client, held for the next poll
    deferred_error: Option<KafkaError>,
}

impl KafkaBrokerClient {
    pub fn new(
        common_config: &KafkaConfig,
        consumer_config: &ConsumerConfig,
    ) -> Result<Self, KafkaError> {
        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &common_config.kafka_hosts)
            .set("group.id", &consumer_config.kafka_consumer_group)
            .set(
                "auto.offset.reset",
                &consumer_config.kafka_consumer_offset_reset,
            )
            .set(
                "enable.auto.commit",
                consumer_config.kafka_consumer_auto_commit.to_string(),
            );

        if consumer_config.kafka_consumer_auto_commit {
            client_config.set(
                "auto.commit.interval.ms",
                consumer_config
                    .kafka_consumer_auto_commit_interval_ms
                    .to_string(),
            );
        }

        if common_config.kafka_tls {
            client_config
                .set("security.protocol", "ssl")
                .set("enable.ssl.certificate.verification", "false");
        };

        debug!("rdkafka configuration: {:?}", client_config);
        let consumer: Inner = client_config.create_with_context(KafkaConsumerContext)?;

        let topics = consumer_config.topics();
        if topics.is_empty() {
            return Err(KafkaError::Subscription("no topics configured".to_string()));
        }
        consumer.subscribe(&topics)?;

        info!(
            topics = ?topics,
            group_id = consumer_config.kafka_consumer_group,
            "Kafka consumer subscribed"
        );

        Ok(Self {
            consumer: Arc::new(consumer),
            max_poll_records: consumer_config.kafka_consumer_max_poll_records.max(1),
            deferred_error: None,
        })
    }

    /// A handle for committing offsets through this client without owning it.
    /// Commits made after the client is closed fail with [`OffsetErr::Gone`].
    pub fn commit_handle(&self) -> CommitHandle {
        CommitHandle {
            handle: Arc::downgrade(&self.consumer),
        }
    }
}

impl BrokerClient for KafkaBrokerClient {
    fn poll(&mut self, timeout: Duration) -> Result<RecordBatch, PollErr> {
        let consumer = &self.consumer;
        let records = drain_batch(
            self.max_poll_records,
            timeout,
            &mut self.deferred_error,
            |wait| consumer.poll(wait).map(|r| r.map(|m| RawRecord::from(&m))),
        )?;

        Ok(records.into())
    }

    fn close(self) -> Result<(), CloseErr> {
        self.consumer.unsubscribe();
        let consumer = Arc::try_unwrap(self.consumer).map_err(|_| CloseErr::InUse)?;
        // Dropping the last reference leaves the group and closes the client
        drop(consumer);
        info!("Kafka consumer closed");
        Ok(())
    }
}

/// Collect up to `max` records, waiting `timeout` for the first one only; the
/// rest are whatever the client already buffered.
///
/// The client's position has moved past every record it handed out, so an
/// error arriving after some records were collected must not discard them:
/// the records are returned and the error is parked in `deferred`, to be
/// returned by the next call before anything else is read.
fn drain_batch<F>(
    max: usize,
    timeout: Duration,
    deferred: &mut Option<KafkaError>,
    mut next: F,
) -> Result<Vec<RawRecord>, KafkaError>
where
    F: FnMut(Duration) -> Option<Result<RawRecord, KafkaError>>,
{
    if let Some(e) = deferred.take() {
        return Err(e);
    }

    let mut records = Vec::new();
    let mut wait = timeout;
    while records.len() < max {
        match next(wait) {
            Some(Ok(record)) => records.push(record),
            Some(Err(e)) if records.is_empty() => return Err(e),
            Some(Err(e)) => {
                warn!(
                    collected = records.len(),
                    "Poll failed mid-batch, returning collected records first: {}", e
                );
                *deferred = Some(e);
                break;
            }
            None => break,
        }
        wait = Duration::ZERO;
    }

    Ok(records)
}

#[derive(Clone)]
pub struct CommitHandle {
    handle: Weak<Inner>,
}

impl CommitHandle {
    pub fn commit(&self, offsets: &OffsetMap, mode: CommitMode) -> Result<(), OffsetErr> {
        let consumer = self.handle.upgrade().ok_or(OffsetErr::Gone)?;

        if offsets.is_empty() {
            debug!("No offsets to commit");
            return Ok(());
        }

        let mut list = TopicPartitionList::new();
        for (partition, position) in offsets {
            let mut elem = list.add_partition(partition.topic(), partition.partition());
            elem.set_offset(Offset::Offset(position.offset()))?;
            elem.set_metadata(position.metadata());
        }

        consumer.commit(&list, mode)?;
        Ok(())
    }
}
