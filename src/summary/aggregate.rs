//! On-demand monthly aggregation seam
//!
//! Used only by [`DailyPolicy::ComputeOnDemand`](super::DailyPolicy). The
//! aggregation itself lives outside this crate.

use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("aggregation failed for '{month}': {reason}")]
pub struct AggregateError {
    pub month: String,
    pub reason: String,
}

impl AggregateError {
    pub fn new(month: &str, reason: impl Into<String>) -> Self {
        Self {
            month: month.to_string(),
            reason: reason.into(),
        }
    }
}

/// Computes the monthly attendance aggregate for a month
pub trait MonthlyAggregator {
    fn aggregate(&self, month: &str) -> Result<Value, AggregateError>;
}

impl<F> MonthlyAggregator for F
where
    F: Fn(&str) -> Result<Value, AggregateError>,
{
    fn aggregate(&self, month: &str) -> Result<Value, AggregateError> {
        self(month)
    }
}
