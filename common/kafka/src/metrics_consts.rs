/// Counter of consumer group rebalances seen by the consumer, labelled by kind
pub const KAFKA_CONSUMER_REBALANCES: &str = "ingest_consumer_rebalances_total";

/// Counter of offset commit callbacks, labelled by outcome
pub const KAFKA_CONSUMER_OFFSET_COMMITS: &str = "ingest_consumer_offset_commits_total";
