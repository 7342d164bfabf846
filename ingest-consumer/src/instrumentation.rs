use std::error::Error;
use std::fmt;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::metrics_consts::{
    MESSAGES_FILTERED, NON_FATAL_ERRORS, PULLED_BATCH_SIZE, PULL_DURATION_MS,
};

/// Side channel for logs and metrics. None of these calls may fail or panic.
pub trait Instrumentation: Send + Sync {
    fn log_info(&self, args: fmt::Arguments<'_>);

    fn log_debug(&self, args: fmt::Arguments<'_>);

    fn capture_pulled_message_histogram(&self, count: usize);

    fn capture_pull_duration(&self, elapsed: Duration);

    fn capture_filtered_message_count(&self, count: usize, filter_expression: &str);

    fn capture_non_fatal_error(&self, error: &(dyn Error + 'static), context: &str);
}

/// Logs through `tracing` and records through the `metrics` facade.
#[derive(Debug, Default)]
pub struct MetricsInstrumentation;

impl Instrumentation for MetricsInstrumentation {
    fn log_info(&self, args: fmt::Arguments<'_>) {
        info!("{}", args);
    }

    fn log_debug(&self, args: fmt::Arguments<'_>) {
        debug!("{}", args);
    }

    fn capture_pulled_message_histogram(&self, count: usize) {
        metrics::histogram!(PULLED_BATCH_SIZE).record(count as f64);
    }

    fn capture_pull_duration(&self, elapsed: Duration) {
        metrics::histogram!(PULL_DURATION_MS).record(elapsed.as_millis() as f64);
    }

    fn capture_filtered_message_count(&self, count: usize, filter_expression: &str) {
        metrics::counter!(MESSAGES_FILTERED, "filter" => filter_expression.to_owned())
            .increment(count as u64);
    }

    fn capture_non_fatal_error(&self, error: &(dyn Error + 'static), context: &str) {
        warn!(error = %error, context, "Non-fatal error");
        metrics::counter!(NON_FATAL_ERRORS, "context" => context.to_owned()).increment(1);
    }
}
