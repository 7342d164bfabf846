use common_kafka::{OffsetErr, PollErr};
use thiserror::Error;

/// A filter could not decide which messages to keep.
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("invalid filter expression {expression:?}: {source}")]
    InvalidExpression {
        expression: String,
        source: regex::Error,
    },
    #[error("a filter expression is required for data source {0}")]
    MissingExpression(String),
    #[error("{0} is not a valid filter data source")]
    UnknownDataSource(String),
    #[error("filter {filter:?} failed on message at {topic}/{partition}@{offset}: {reason}")]
    Evaluation {
        filter: String,
        topic: String,
        partition: i32,
        offset: i64,
        reason: String,
    },
}

#[derive(Error, Debug)]
pub enum CommitError {
    #[error("failed to commit offsets: {0}")]
    Offset(#[from] OffsetErr),
    #[error("no batch has been pulled yet, nothing to commit")]
    NothingPulled,
}

#[derive(Error, Debug)]
pub enum PullError {
    #[error("failed to poll the broker: {0}")]
    Poll(#[from] PollErr),
    #[error("failed to filter pulled messages: {0}")]
    Filter(#[from] FilterError),
}

#[derive(Error, Debug)]
pub enum WorkerError {
    #[error(transparent)]
    Pull(#[from] PullError),
    #[error(transparent)]
    Commit(#[from] CommitError),
    #[error("failed to process batch: {0}")]
    Process(anyhow::Error),
}
