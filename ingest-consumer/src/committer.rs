use common_kafka::{CommitHandle, CommitMode, OffsetMap, RecordBatch};
use tracing::debug;

use crate::error::CommitError;

/// Durably records consumed positions.
pub trait OffsetCommitter: Send + Sync {
    /// Commit exactly the given positions.
    fn commit_offsets(&self, offsets: &OffsetMap) -> Result<(), CommitError>;

    /// Commit everything in a pulled batch. `None` means nothing has been
    /// pulled yet; each committer decides what that means for it.
    fn commit_batch(&self, batch: Option<&RecordBatch>) -> Result<(), CommitError>;
}

/// Commits through the broker client's consumer group.
pub struct KafkaOffsetCommitter {
    handle: CommitHandle,
    mode: CommitMode,
}

impl KafkaOffsetCommitter {
    pub fn new(handle: CommitHandle, async_commit: bool) -> Self {
        let mode = if async_commit {
            CommitMode::Async
        } else {
            CommitMode::Sync
        };
        Self { handle, mode }
    }
}

impl OffsetCommitter for KafkaOffsetCommitter {
    fn commit_offsets(&self, offsets: &OffsetMap) -> Result<(), CommitError> {
        self.handle.commit(offsets, self.mode)?;
        Ok(())
    }

    fn commit_batch(&self, batch: Option<&RecordBatch>) -> Result<(), CommitError> {
        let batch = batch.ok_or(CommitError::NothingPulled)?;
        let offsets = batch.next_offsets();
        debug!(
            partitions = offsets.len(),
            records = batch.len(),
            "Committing pulled batch"
        );
        self.commit_offsets(&offsets)
    }
}

/// For consumers running with broker-side auto commit: every call succeeds
/// without doing anything.
#[derive(Debug, Default)]
pub struct AutoOffsetCommitter;

impl OffsetCommitter for AutoOffsetCommitter {
    fn commit_offsets(&self, _offsets: &OffsetMap) -> Result<(), CommitError> {
        Ok(())
    }

    fn commit_batch(&self, _batch: Option<&RecordBatch>) -> Result<(), CommitError> {
        Ok(())
    }
}
