use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use regex::bytes::Regex;
use tracing::info;

use crate::config::FilterConfig;
use crate::error::FilterError;
use crate::message::NormalizedMessage;

/// Decides which pulled messages are handed on to the caller.
pub trait Filter: Send + Sync {
    /// Return the messages to keep, in their original relative order.
    fn filter(
        &self,
        messages: Vec<NormalizedMessage>,
    ) -> Result<Vec<NormalizedMessage>, FilterError>;

    /// Human readable form of the active rule, used to label metrics.
    fn description(&self) -> &str;
}

/// Keeps every message.
#[derive(Debug, Default)]
pub struct NoOpFilter;

impl Filter for NoOpFilter {
    fn filter(
        &self,
        messages: Vec<NormalizedMessage>,
    ) -> Result<Vec<NormalizedMessage>, FilterError> {
        Ok(messages)
    }

    fn description(&self) -> &str {
        ""
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchTarget {
    Key,
    Value,
}

/// Keeps the messages whose key or value bytes match a regular expression.
#[derive(Debug)]
pub struct RegexFilter {
    target: MatchTarget,
    pattern: Regex,
    expression: String,
}

impl RegexFilter {
    pub fn new(target: MatchTarget, expression: &str) -> Result<Self, FilterError> {
        let pattern = Regex::new(expression).map_err(|source| FilterError::InvalidExpression {
            expression: expression.to_string(),
            source,
        })?;

        Ok(Self {
            target,
            pattern,
            expression: expression.to_string(),
        })
    }

    fn matches(&self, message: &NormalizedMessage) -> bool {
        let data = match self.target {
            MatchTarget::Key => message.key(),
            MatchTarget::Value => message.value(),
        };
        self.pattern.is_match(data)
    }
}

impl Filter for RegexFilter {
    fn filter(
        &self,
        messages: Vec<NormalizedMessage>,
    ) -> Result<Vec<NormalizedMessage>, FilterError> {
        Ok(messages.into_iter().filter(|m| self.matches(m)).collect())
    }

    fn description(&self) -> &str {
        &self.expression
    }
}

/// Which part of a message the configured expression is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDataSource {
    None,
    Key,
    Message,
}

impl FromStr for FilterDataSource {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "none" => Ok(FilterDataSource::None),
            "key" => Ok(FilterDataSource::Key),
            "message" => Ok(FilterDataSource::Message),
            _ => Err(FilterError::UnknownDataSource(s.to_string())),
        }
    }
}

impl fmt::Display for FilterDataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterDataSource::None => "none",
            FilterDataSource::Key => "key",
            FilterDataSource::Message => "message",
        };
        f.write_str(name)
    }
}

pub fn build_filter(config: &FilterConfig) -> Result<Arc<dyn Filter>, FilterError> {
    let target = match config.filter_data_source {
        FilterDataSource::None => {
            info!("No filter configured, all messages are kept");
            return Ok(Arc::new(NoOpFilter));
        }
        FilterDataSource::Key => MatchTarget::Key,
        FilterDataSource::Message => MatchTarget::Value,
    };

    if config.filter_expression.is_empty() {
        return Err(FilterError::MissingExpression(
            config.filter_data_source.to_string(),
        ));
    }

    info!(
        data_source = %config.filter_data_source,
        expression = config.filter_expression,
        "Filtering messages"
    );
    Ok(Arc::new(RegexFilter::new(target, &config.filter_expression)?))
}
