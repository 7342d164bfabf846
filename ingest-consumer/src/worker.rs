use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use common_kafka::BrokerClient;
use tracing::{error, info};

use crate::consumer::Consumer;
use crate::error::WorkerError;
use crate::message::NormalizedMessage;

/// Drives a [`Consumer`] through pull → process → commit until asked to stop.
pub struct Worker<B> {
    consumer: Consumer<B>,
    shutdown: Arc<AtomicBool>,
}

impl<B: BrokerClient> Worker<B> {
    pub fn new(consumer: Consumer<B>, shutdown: Arc<AtomicBool>) -> Self {
        Self { consumer, shutdown }
    }

    /// Run until the shutdown flag is raised or an iteration fails. The
    /// consumer is closed on the way out either way.
    pub fn run<F>(self, mut process: F) -> Result<(), WorkerError>
    where
        F: FnMut(&[NormalizedMessage]) -> anyhow::Result<()>,
    {
        let Self {
            mut consumer,
            shutdown,
        } = self;

        info!("Starting consumer loop");
        let mut result = Ok(());
        while !shutdown.load(Ordering::SeqCst) {
            if let Err(e) = Self::process_next(&mut consumer, &mut process) {
                error!("Consumer loop failed: {}", e);
                result = Err(e);
                break;
            }
        }

        info!("Consumer loop shutting down");
        consumer.close();
        result
    }

    fn process_next<F>(consumer: &mut Consumer<B>, process: &mut F) -> Result<(), WorkerError>
    where
        F: FnMut(&[NormalizedMessage]) -> anyhow::Result<()>,
    {
        let messages = consumer.pull()?;
        if !messages.is_empty() {
            process(&messages).map_err(WorkerError::Process)?;
        }

        // Batches the filter emptied completely still move the committed position
        if consumer.last_batch().is_some_and(|b| !b.is_empty()) {
            consumer.commit()?;
        }

        Ok(())
    }
}
