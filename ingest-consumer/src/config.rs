use std::str::FromStr;
use std::time::Duration;

use envconfig::Envconfig;

pub use common_kafka::config::{ConsumerConfig, KafkaConfig};

use crate::filter::FilterDataSource;

#[derive(Envconfig, Clone, Debug)]
pub struct Config {
    #[envconfig(from = "BIND_HOST", default = "::")]
    pub bind_host: String,

    #[envconfig(from = "BIND_PORT", default = "3302")]
    pub bind_port: u16,

    #[envconfig(nested = true)]
    pub kafka: KafkaConfig,

    #[envconfig(nested = true)]
    pub consumer: ConsumerConfig,

    #[envconfig(nested = true)]
    pub filter: FilterConfig,

    #[envconfig(from = "SOURCE_KAFKA_POLL_TIMEOUT_MS", default = "10000")]
    pub poll_timeout: PollTimeout,
}

impl Config {
    /// Produce a host:port address for binding a TcpListener.
    pub fn bind(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }
}

#[derive(Envconfig, Clone, Debug)]
pub struct FilterConfig {
    #[envconfig(from = "FILTER_DATA_SOURCE", default = "none")]
    pub filter_data_source: FilterDataSource,

    #[envconfig(from = "FILTER_EXPRESSION", default = "")]
    pub filter_expression: String,
}

/// How long a single pull may block waiting for records. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTimeout(pub Duration);

#[derive(Debug, PartialEq, Eq)]
pub struct ParsePollTimeoutError;

impl FromStr for PollTimeout {
    type Err = ParsePollTimeoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ms = s.parse::<u64>().map_err(|_| ParsePollTimeoutError)?;
        if ms == 0 {
            return Err(ParsePollTimeoutError);
        }

        Ok(PollTimeout(Duration::from_millis(ms)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poll_timeout_parsing() {
        assert_eq!(
            "250".parse::<PollTimeout>(),
            Ok(PollTimeout(Duration::from_millis(250)))
        );
        assert_eq!("0".parse::<PollTimeout>(), Err(ParsePollTimeoutError));
        assert_eq!("-5".parse::<PollTimeout>(), Err(ParsePollTimeoutError));
        assert_eq!("soon".parse::<PollTimeout>(), Err(ParsePollTimeoutError));
    }

    #[test]
    fn test_bind_address() {
        let config = Config {
            bind_host: "0.0.0.0".to_string(),
            bind_port: 3302,
            kafka: KafkaConfig {
                kafka_hosts: "localhost:9092".to_string(),
                kafka_tls: false,
            },
            consumer: ConsumerConfig {
                kafka_consumer_group: "ingest".to_string(),
                kafka_consumer_topic: "events".to_string(),
                kafka_consumer_offset_reset: "earliest".to_string(),
                kafka_consumer_auto_commit: false,
                kafka_consumer_auto_commit_interval_ms: 5000,
                kafka_consumer_max_poll_records: 500,
                kafka_consumer_async_commit: false,
            },
            filter: FilterConfig {
                filter_data_source: FilterDataSource::None,
                filter_expression: String::new(),
            },
            poll_timeout: PollTimeout(Duration::from_millis(10000)),
        };

        assert_eq!(config.bind(), "0.0.0.0:3302");
    }
}
