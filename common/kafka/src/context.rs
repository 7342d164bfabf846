use rdkafka::consumer::{BaseConsumer, ConsumerContext, Rebalance};
use rdkafka::error::KafkaResult;
use rdkafka::{ClientContext, TopicPartitionList};
use tracing::{debug, error, info, warn};

use crate::metrics_consts::{KAFKA_CONSUMER_OFFSET_COMMITS, KAFKA_CONSUMER_REBALANCES};

/// Consumer context that only observes: group membership changes and commit
/// outcomes are logged and counted, never acted upon.
#[derive(Default)]
pub struct KafkaConsumerContext;

impl ClientContext for KafkaConsumerContext {}

impl ConsumerContext for KafkaConsumerContext {
    fn pre_rebalance(&self, _base_consumer: &BaseConsumer<Self>, rebalance: &Rebalance) {
        debug!("Pre-rebalance event: {:?}", rebalance);
    }

    fn post_rebalance(&self, _base_consumer: &BaseConsumer<Self>, rebalance: &Rebalance) {
        match rebalance {
            Rebalance::Assign(partitions) => {
                info!("Assigned {} partitions", partitions.count());
                metrics::counter!(KAFKA_CONSUMER_REBALANCES, "kind" => "assign").increment(1);
            }
            Rebalance::Revoke(partitions) => {
                info!("Revoked {} partitions", partitions.count());
                metrics::counter!(KAFKA_CONSUMER_REBALANCES, "kind" => "revoke").increment(1);
            }
            Rebalance::Error(e) => {
                error!("Post-rebalance error: {}", e);
                metrics::counter!(KAFKA_CONSUMER_REBALANCES, "kind" => "error").increment(1);
            }
        }
    }

    fn commit_callback(&self, result: KafkaResult<()>, offsets: &TopicPartitionList) {
        match result {
            Ok(_) => {
                debug!("Committed offsets for {} partitions", offsets.count());
                metrics::counter!(KAFKA_CONSUMER_OFFSET_COMMITS, "outcome" => "success")
                    .increment(1);
            }
            Err(e) => {
                warn!("Failed to commit offsets: {}", e);
                metrics::counter!(KAFKA_CONSUMER_OFFSET_COMMITS, "outcome" => "failure")
                    .increment(1);
            }
        }
    }
}
