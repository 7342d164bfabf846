use std::collections::HashMap;

use rdkafka::message::{BorrowedMessage, Headers, Message};

/// Broker timestamp used when the broker did not attach one to a record.
pub const NO_TIMESTAMP: i64 = -1;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TopicPartition {
    topic: String,
    partition: i32,
}

impl TopicPartition {
    pub fn new(topic: impl Into<String>, partition: i32) -> Self {
        Self {
            topic: topic.into(),
            partition,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn partition(&self) -> i32 {
        self.partition
    }
}

/// The position to resume from, plus an opaque string stored alongside it by the broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetAndMetadata {
    offset: i64,
    metadata: String,
}

impl OffsetAndMetadata {
    pub fn new(offset: i64, metadata: impl Into<String>) -> Self {
        Self {
            offset,
            metadata: metadata.into(),
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn metadata(&self) -> &str {
        &self.metadata
    }
}

impl From<i64> for OffsetAndMetadata {
    fn from(offset: i64) -> Self {
        Self::new(offset, "")
    }
}

pub type OffsetMap = HashMap<TopicPartition, OffsetAndMetadata>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordHeader {
    pub key: String,
    pub value: Option<Vec<u8>>,
}

/// A record exactly as the broker handed it over, detached from the client's buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub key: Option<Vec<u8>>,
    pub value: Option<Vec<u8>>,
    pub topic: String,
    pub partition: i32,
    pub offset: i64,
    pub headers: Vec<RecordHeader>,
    pub timestamp: i64,
}

impl RawRecord {
    pub fn topic_partition(&self) -> TopicPartition {
        TopicPartition::new(self.topic.as_str(), self.partition)
    }
}

impl From<&BorrowedMessage<'_>> for RawRecord {
    fn from(msg: &BorrowedMessage<'_>) -> Self {
        let headers = msg
            .headers()
            .map(|hdrs| {
                hdrs.iter()
                    .map(|h| RecordHeader {
                        key: h.key.to_string(),
                        value: h.value.map(|v| v.to_vec()),
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            key: msg.key().map(|k| k.to_vec()),
            value: msg.payload().map(|p| p.to_vec()),
            topic: msg.topic().to_owned(),
            partition: msg.partition(),
            offset: msg.offset(),
            headers,
            timestamp: msg.timestamp().to_millis().unwrap_or(NO_TIMESTAMP),
        }
    }
}

/// Everything returned by one poll, in broker order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordBatch {
    records: Vec<RawRecord>,
}

impl RecordBatch {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RawRecord> {
        self.records.iter()
    }

    pub fn records(&self) -> &[RawRecord] {
        &self.records
    }

    /// The offsets to commit once every record in the batch has been processed:
    /// the highest offset seen per partition, plus one.
    pub fn next_offsets(&self) -> OffsetMap {
        let mut offsets = OffsetMap::new();
        for record in &self.records {
            let next = record.offset + 1;
            offsets
                .entry(record.topic_partition())
                .and_modify(|current| {
                    if next > current.offset() {
                        *current = next.into();
                    }
                })
                .or_insert_with(|| next.into());
        }
        offsets
    }
}

impl From<Vec<RawRecord>> for RecordBatch {
    fn from(records: Vec<RawRecord>) -> Self {
        Self::new(records)
    }
}

impl<'a> IntoIterator for &'a RecordBatch {
    type Item = &'a RawRecord;
    type IntoIter = std::slice::Iter<'a, RawRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
