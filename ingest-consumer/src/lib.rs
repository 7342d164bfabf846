pub mod committer;
pub mod config;
pub mod consumer;
pub mod error;
pub mod filter;
pub mod instrumentation;
pub mod message;
pub mod metrics;
pub mod metrics_consts;
pub mod worker;

#[cfg(test)]
mod test_utils;
