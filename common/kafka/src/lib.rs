pub mod config;
pub mod context;
pub mod kafka_consumer;
pub mod metrics_consts;
pub mod record;

pub use kafka_consumer::{
    BrokerClient, CloseErr, CommitHandle, KafkaBrokerClient, OffsetErr, PollErr,
};
pub use rdkafka::consumer::CommitMode;
pub use record::{
    OffsetAndMetadata, OffsetMap, RawRecord, RecordBatch, RecordHeader, TopicPartition,
};
