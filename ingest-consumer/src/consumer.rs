use std::sync::Arc;
use std::time::{Duration, Instant};

use common_kafka::{BrokerClient, OffsetMap, RecordBatch};

use crate::committer::OffsetCommitter;
use crate::error::{CommitError, FilterError, PullError};
use crate::filter::Filter;
use crate::instrumentation::Instrumentation;
use crate::message::NormalizedMessage;

/// Pulls batches from a broker client, normalizes and filters them, and
/// commits on the caller's behalf.
///
/// A `Consumer` is driven by one thread: `pull`, `commit` and `close` are
/// called in sequence, never concurrently. `pull` takes `&mut self` and
/// `close` consumes the consumer, so the compiler holds callers to that.
pub struct Consumer<B> {
    client: B,
    poll_timeout: Duration,
    filter: Arc<dyn Filter>,
    committer: Arc<dyn OffsetCommitter>,
    instrumentation: Arc<dyn Instrumentation>,

    // Raw batch from the most recent poll, kept for `commit`
    last_batch: Option<RecordBatch>,
}

impl<B: BrokerClient> Consumer<B> {
    pub fn new(
        client: B,
        poll_timeout: Duration,
        filter: Arc<dyn Filter>,
        committer: Arc<dyn OffsetCommitter>,
        instrumentation: Arc<dyn Instrumentation>,
    ) -> Self {
        Self {
            client,
            poll_timeout,
            filter,
            committer,
            instrumentation,
            last_batch: None,
        }
    }

    /// Read the next batch, blocking for at most the poll timeout.
    ///
    /// Messages come back in broker order minus whatever the filter dropped.
    /// Broker and filter errors are returned as they are, without retrying.
    /// The raw batch is retained as soon as the poll returns, so a failing
    /// filter still leaves it available to `commit`.
    pub fn pull(&mut self) -> Result<Vec<NormalizedMessage>, PullError> {
        let start = Instant::now();
        let batch = self.client.poll(self.poll_timeout)?;
        self.instrumentation.capture_pull_duration(start.elapsed());

        let batch = self.last_batch.insert(batch);
        self.instrumentation
            .log_info(format_args!("Pulled {} messages", batch.len()));
        self.instrumentation
            .capture_pulled_message_histogram(batch.len());

        let mut messages = Vec::with_capacity(batch.len());
        for record in batch.iter() {
            messages.push(NormalizedMessage::from_record(record));
            self.instrumentation
                .log_debug(format_args!("Pulled record: {:?}", record));
        }

        Ok(self.apply_filter(messages)?)
    }

    fn apply_filter(
        &self,
        messages: Vec<NormalizedMessage>,
    ) -> Result<Vec<NormalizedMessage>, FilterError> {
        let pulled = messages.len();
        let kept = self.filter.filter(messages)?;

        let filtered = pulled.saturating_sub(kept.len());
        if filtered > 0 {
            self.instrumentation
                .capture_filtered_message_count(filtered, self.filter.description());
        }

        Ok(kept)
    }

    /// Commit the given positions as they are.
    pub fn commit_offsets(&self, offsets: &OffsetMap) -> Result<(), CommitError> {
        self.committer.commit_offsets(offsets)
    }

    /// Commit everything returned by the most recent poll. Before the first
    /// poll the committer is told there is no batch and decides what to do.
    pub fn commit(&self) -> Result<(), CommitError> {
        self.committer.commit_batch(self.last_batch.as_ref())
    }

    /// Release the broker client. Failures are reported to instrumentation
    /// and otherwise ignored, so shutdown always proceeds.
    pub fn close(self) {
        self.instrumentation
            .log_info(format_args!("Consumer is closing"));
        if let Err(e) = self.client.close() {
            self.instrumentation
                .capture_non_fatal_error(&e, "Exception while closing consumer");
        }
    }

    pub fn last_batch(&self) -> Option<&RecordBatch> {
        self.last_batch.as_ref()
    }

    pub fn filter(&self) -> &Arc<dyn Filter> {
        &self.filter
    }
}
