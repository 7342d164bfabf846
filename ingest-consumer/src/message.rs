use common_kafka::RawRecord;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    pub key: String,
    pub value: Vec<u8>,
}

/// A consumed record in the shape the rest of the pipeline works with.
///
/// Missing keys, values and header values become empty byte strings. The
/// consume timestamp is taken from the local clock when the message is built
/// and cannot change afterwards; it is unrelated to the broker's clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedMessage {
    key: Vec<u8>,
    value: Vec<u8>,
    topic: String,
    partition: i32,
    offset: i64,
    headers: Vec<MessageHeader>,
    timestamp: i64,
    consume_timestamp: i64,
}

impl NormalizedMessage {
    pub fn from_record(record: &RawRecord) -> Self {
        Self {
            key: record.key.clone().unwrap_or_default(),
            value: record.value.clone().unwrap_or_default(),
            topic: record.topic.clone(),
            partition: record.partition,
            offset: record.offset,
            headers: record
                .headers
                .iter()
                .map(|h| MessageHeader {
                    key: h.key.clone(),
                    value: h.value.clone().unwrap_or_default(),
                })
                .collect(),
            timestamp: record.timestamp,
            consume_timestamp: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Get the message key as a UTF-8 string if possible
    pub fn key_as_str(&self) -> Result<&str, std::str::Utf8Error> {
        std::str::from_utf8(&self.key)
    }

    pub fn value(&self) -> &[u8] {
        &self.value
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn partition(&self) -> i32 {
        self.partition
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn headers(&self) -> &[MessageHeader] {
        &self.headers
    }

    pub fn header(&self, key: &str) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|h| h.key == key)
            .map(|h| h.value.as_slice())
    }

    /// Broker-assigned timestamp, in milliseconds since the epoch
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    /// Local time the message was built, in milliseconds since the epoch
    pub fn consume_timestamp(&self) -> i64 {
        self.consume_timestamp
    }
}
