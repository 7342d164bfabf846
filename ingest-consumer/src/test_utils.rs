use std::collections::VecDeque;
use std::error::Error;
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use common_kafka::{
    BrokerClient, CloseErr, OffsetMap, PollErr, RawRecord, RecordBatch, RecordHeader,
};

use crate::committer::OffsetCommitter;
use crate::error::{CommitError, FilterError};
use crate::filter::Filter;
use crate::instrumentation::Instrumentation;
use crate::message::NormalizedMessage;

pub fn record(topic: &str, partition: i32, offset: i64) -> RawRecord {
    RawRecord {
        key: Some(format!("key-{offset}").into_bytes()),
        value: Some(format!("value-{offset}").into_bytes()),
        topic: topic.to_string(),
        partition,
        offset,
        headers: vec![RecordHeader {
            key: "source".to_string(),
            value: Some(b"test".to_vec()),
        }],
        timestamp: 1_700_000_000_000 + offset,
    }
}

pub fn message(topic: &str, partition: i32, offset: i64) -> NormalizedMessage {
    NormalizedMessage::from_record(&record(topic, partition, offset))
}

/// Broker client returning scripted poll results, then empty batches once the script runs out.
#[derive(Default)]
pub struct StubBrokerClient {
    polls: VecDeque<Result<RecordBatch, PollErr>>,
    fail_close: bool,
    close_calls: Arc<AtomicUsize>,
    drained: Option<Arc<AtomicBool>>,
}

impl StubBrokerClient {
    pub fn with_batches(batches: Vec<Vec<RawRecord>>) -> Self {
        Self {
            polls: batches.into_iter().map(|b| Ok(b.into())).collect(),
            ..Default::default()
        }
    }

    pub fn push_error(&mut self, error: PollErr) {
        self.polls.push_back(Err(error));
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    /// Raise `flag` once every scripted poll result has been handed out.
    pub fn raise_when_drained(mut self, flag: Arc<AtomicBool>) -> Self {
        self.drained = Some(flag);
        self
    }

    pub fn close_calls(&self) -> Arc<AtomicUsize> {
        self.close_calls.clone()
    }
}

impl BrokerClient for StubBrokerClient {
    fn poll(&mut self, _timeout: Duration) -> Result<RecordBatch, PollErr> {
        let next = self
            .polls
            .pop_front()
            .unwrap_or_else(|| Ok(RecordBatch::default()));
        if self.polls.is_empty() {
            if let Some(flag) = &self.drained {
                flag.store(true, Ordering::SeqCst);
            }
        }
        next
    }

    fn close(self) -> Result<(), CloseErr> {
        self.close_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            Err(CloseErr::InUse)
        } else {
            Ok(())
        }
    }
}

/// Drops messages at the given offsets, whatever their partition.
pub struct DropOffsetsFilter {
    offsets: Vec<i64>,
    description: String,
}

impl DropOffsetsFilter {
    pub fn new(offsets: &[i64]) -> Self {
        Self {
            offsets: offsets.to_vec(),
            description: format!("drop offsets {offsets:?}"),
        }
    }
}

impl Filter for DropOffsetsFilter {
    fn filter(
        &self,
        messages: Vec<NormalizedMessage>,
    ) -> Result<Vec<NormalizedMessage>, FilterError> {
        Ok(messages
            .into_iter()
            .filter(|m| !self.offsets.contains(&m.offset()))
            .collect())
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Fails on the first message it sees.
pub struct FailingFilter;

impl Filter for FailingFilter {
    fn filter(
        &self,
        messages: Vec<NormalizedMessage>,
    ) -> Result<Vec<NormalizedMessage>, FilterError> {
        match messages.first() {
            Some(m) => Err(FilterError::Evaluation {
                filter: self.description().to_string(),
                topic: m.topic().to_string(),
                partition: m.partition(),
                offset: m.offset(),
                reason: "malformed message".to_string(),
            }),
            None => Ok(messages),
        }
    }

    fn description(&self) -> &str {
        "always fails"
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CommitCall {
    Offsets(OffsetMap),
    Batch(Option<RecordBatch>),
}

#[derive(Default)]
pub struct RecordingCommitter {
    calls: Mutex<Vec<CommitCall>>,
    fail: AtomicBool,
}

impl RecordingCommitter {
    pub fn calls(&self) -> Vec<CommitCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fail_with_nothing_pulled(&self) {
        self.fail.store(true, Ordering::SeqCst);
    }

    fn result(&self) -> Result<(), CommitError> {
        if self.fail.load(Ordering::SeqCst) {
            Err(CommitError::NothingPulled)
        } else {
            Ok(())
        }
    }
}

impl OffsetCommitter for RecordingCommitter {
    fn commit_offsets(&self, offsets: &OffsetMap) -> Result<(), CommitError> {
        self.calls
            .lock()
            .unwrap()
            .push(CommitCall::Offsets(offsets.clone()));
        self.result()
    }

    fn commit_batch(&self, batch: Option<&RecordBatch>) -> Result<(), CommitError> {
        self.calls
            .lock()
            .unwrap()
            .push(CommitCall::Batch(batch.cloned()));
        self.result()
    }
}

#[derive(Default)]
pub struct RecordingInstrumentation {
    info_logs: Mutex<Vec<String>>,
    debug_logs: Mutex<Vec<String>>,
    pulled: Mutex<Vec<usize>>,
    pull_durations: Mutex<Vec<Duration>>,
    filtered: Mutex<Vec<(usize, String)>>,
    non_fatal: Mutex<Vec<(String, String)>>,
}

impl RecordingInstrumentation {
    pub fn info_logs(&self) -> Vec<String> {
        self.info_logs.lock().unwrap().clone()
    }

    pub fn debug_logs(&self) -> Vec<String> {
        self.debug_logs.lock().unwrap().clone()
    }

    pub fn pulled_histogram(&self) -> Vec<usize> {
        self.pulled.lock().unwrap().clone()
    }

    pub fn filtered_counts(&self) -> Vec<(usize, String)> {
        self.filtered.lock().unwrap().clone()
    }

    pub fn non_fatal_errors(&self) -> Vec<(String, String)> {
        self.non_fatal.lock().unwrap().clone()
    }
}

impl Instrumentation for RecordingInstrumentation {
    fn log_info(&self, args: fmt::Arguments<'_>) {
        self.info_logs.lock().unwrap().push(args.to_string());
    }

    fn log_debug(&self, args: fmt::Arguments<'_>) {
        self.debug_logs.lock().unwrap().push(args.to_string());
    }

    fn capture_pulled_message_histogram(&self, count: usize) {
        self.pulled.lock().unwrap().push(count);
    }

    fn capture_pull_duration(&self, elapsed: Duration) {
        self.pull_durations.lock().unwrap().push(elapsed);
    }

    fn capture_filtered_message_count(&self, count: usize, filter_expression: &str) {
        self.filtered
            .lock()
            .unwrap()
            .push((count, filter_expression.to_string()));
    }

    fn capture_non_fatal_error(&self, error: &(dyn Error + 'static), context: &str) {
        self.non_fatal
            .lock()
            .unwrap()
            .push((error.to_string(), context.to_string()));
    }
}
