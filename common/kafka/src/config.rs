use envconfig::Envconfig;

#[derive(Envconfig, Clone, Debug)]
pub struct KafkaConfig {
    #[envconfig(default = "localhost:9092")]
    pub kafka_hosts: String,

    #[envconfig(default = "false")]
    pub kafka_tls: bool,
}

#[derive(Envconfig, Clone, Debug)]
pub struct ConsumerConfig {
    pub kafka_consumer_group: String,

    // Comma separated. Entries starting with `^` are subscribed to as patterns.
    pub kafka_consumer_topic: String,

    #[envconfig(default = "earliest")]
    pub kafka_consumer_offset_reset: String, // earliest, latest

    // When enabled the broker client commits on its own schedule and explicit
    // commits become no-ops.
    #[envconfig(default = "false")]
    pub kafka_consumer_auto_commit: bool,

    #[envconfig(default = "5000")]
    pub kafka_consumer_auto_commit_interval_ms: u32,

    // Upper bound on the records returned by a single poll
    #[envconfig(default = "500")]
    pub kafka_consumer_max_poll_records: usize,

    #[envconfig(default = "false")]
    pub kafka_consumer_async_commit: bool,
}

impl ConsumerConfig {
    pub fn topics(&self) -> Vec<&str> {
        self.kafka_consumer_topic
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }
}
