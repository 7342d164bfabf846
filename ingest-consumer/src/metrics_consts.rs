/// Histogram of the number of records returned by each pull
pub const PULLED_BATCH_SIZE: &str = "ingest_consumer_pulled_batch_size";

/// Histogram of time spent blocked in the broker client per pull
pub const PULL_DURATION_MS: &str = "ingest_consumer_pull_duration_ms";

/// Counter of messages dropped by the filter, labelled with the filter expression
pub const MESSAGES_FILTERED: &str = "ingest_consumer_messages_filtered_total";

/// Counter of errors that were reported and then swallowed
pub const NON_FATAL_ERRORS: &str = "ingest_consumer_non_fatal_errors_total";
