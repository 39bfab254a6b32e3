//! Summary request dispatch
//!
//! Selects the weekly or daily source for a request and turns every outcome,
//! including faults, into a JSON body.

use super::aggregate::{AggregateError, MonthlyAggregator};
use super::month::MonthPolicy;
use super::store::{FolderStore, StoreError};
use super::{SummaryKind, SummaryRequest};
use crate::logger;
use hyper::body::Bytes;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

const WEEKLY_NOT_FOUND: &str = "Weekly summary not found";
const WEEKLY_NOT_FOUND_MESSAGE: &str =
    "주간 집계 파일이 없습니다. 이번달주간집계() 함수를 실행하세요.";
const ATTENDANCE_NOT_FOUND: &str = "Attendance summary not found";
const ATTENDANCE_NOT_FOUND_MESSAGE: &str = "일간 출석 파일이 없습니다.";
const INVALID_MONTH: &str = "Invalid month";
const INVALID_MONTH_MESSAGE: &str = "month 파라미터는 YYYY-MM 형식이어야 합니다.";

/// Anything that can go wrong while serving a summary
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    #[error("failed to serialize aggregate: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Where daily (non-weekly) data comes from. A router uses exactly one.
#[derive(Clone, Default)]
pub enum DailyPolicy {
    /// Read `attendance_summary_<month>.json` from the folder store
    #[default]
    FileLookup,
    /// Compute the aggregate on every request
    ComputeOnDemand(Arc<dyn MonthlyAggregator + Send + Sync>),
}

impl fmt::Debug for DailyPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FileLookup => f.write_str("FileLookup"),
            Self::ComputeOnDemand(_) => f.write_str("ComputeOnDemand"),
        }
    }
}

/// Error body: `{"error": ..., "message": ...}` with `message` optional
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ErrorEnvelope {
    pub fn with_message(error: &str, message: &str) -> Self {
        Self {
            error: error.to_string(),
            message: Some(message.to_string()),
        }
    }

    pub fn not_found(kind: SummaryKind) -> Self {
        match kind {
            SummaryKind::Weekly => Self::with_message(WEEKLY_NOT_FOUND, WEEKLY_NOT_FOUND_MESSAGE),
            SummaryKind::Daily => {
                Self::with_message(ATTENDANCE_NOT_FOUND, ATTENDANCE_NOT_FOUND_MESSAGE)
            }
        }
    }

    pub fn invalid_month() -> Self {
        Self::with_message(INVALID_MONTH, INVALID_MONTH_MESSAGE)
    }

    /// Catch-all body carrying only the fault description
    pub fn fault(err: &impl fmt::Display) -> Self {
        Self {
            error: err.to_string(),
            message: None,
        }
    }

    pub fn to_bytes(&self) -> Bytes {
        match serde_json::to_vec(self) {
            Ok(json) => Bytes::from(json),
            Err(e) => {
                logger::log_error(&format!("Failed to serialize error envelope: {e}"));
                Bytes::from_static(br#"{"error":"Internal error"}"#)
            }
        }
    }
}

/// Outcome class of a summary request, mapped to a status code by the HTTP layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseKind {
    Found,
    NotFound,
    BadRequest,
    Fault,
}

/// JSON body plus its outcome class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryResponse {
    pub kind: ResponseKind,
    pub body: Bytes,
}

impl SummaryResponse {
    pub const fn found(body: Bytes) -> Self {
        Self {
            kind: ResponseKind::Found,
            body,
        }
    }

    pub fn error(kind: ResponseKind, envelope: &ErrorEnvelope) -> Self {
        Self {
            kind,
            body: envelope.to_bytes(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.kind != ResponseKind::Found
    }
}

/// Request router over a folder store
#[derive(Debug)]
pub struct SummaryRouter<S> {
    store: S,
    daily: DailyPolicy,
    month_policy: MonthPolicy,
}

impl<S: FolderStore> SummaryRouter<S> {
    /// Router with file lookup for both paths and strict month checking
    pub fn new(store: S) -> Self {
        Self {
            store,
            daily: DailyPolicy::default(),
            month_policy: MonthPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_daily_policy(mut self, daily: DailyPolicy) -> Self {
        self.daily = daily;
        self
    }

    #[must_use]
    pub fn with_month_policy(mut self, month_policy: MonthPolicy) -> Self {
        self.month_policy = month_policy;
        self
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Serve one request. Never fails: faults become an error envelope.
    pub async fn handle(&self, request: &SummaryRequest) -> SummaryResponse {
        logger::log_summary_request(request.month.as_deref(), request.type_param.as_deref());

        let Some(month) = self.month_policy.resolve(request.month.as_deref()) else {
            return SummaryResponse::error(ResponseKind::BadRequest, &ErrorEnvelope::invalid_month());
        };

        match self.dispatch(request.kind(), month).await {
            Ok(response) => response,
            Err(e) => {
                let reason = e.to_string();
                logger::log_error(&format!("Summary request failed: {}", reason.escape_debug()));
                SummaryResponse::error(ResponseKind::Fault, &ErrorEnvelope::fault(&e))
            }
        }
    }

    async fn dispatch(
        &self,
        kind: SummaryKind,
        month: &str,
    ) -> Result<SummaryResponse, DispatchError> {
        match (kind, &self.daily) {
            (SummaryKind::Daily, DailyPolicy::ComputeOnDemand(aggregator)) => {
                let aggregate = aggregator.aggregate(month)?;
                let json = serde_json::to_vec(&aggregate)?;
                Ok(SummaryResponse::found(Bytes::from(json)))
            }
            _ => self.lookup(kind, month).await,
        }
    }

    async fn lookup(
        &self,
        kind: SummaryKind,
        month: &str,
    ) -> Result<SummaryResponse, DispatchError> {
        let name = kind.file_name(month);
        let Some(file) = self.store.find_by_name(&name).await? else {
            return Ok(SummaryResponse::error(
                ResponseKind::NotFound,
                &ErrorEnvelope::not_found(kind),
            ));
        };

        // Stored bytes are trusted to be JSON already and are passed through untouched
        let content = self.store.read_content(&file).await?;
        Ok(SummaryResponse::found(content))
    }
}
