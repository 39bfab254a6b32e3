//! Summary domain module
//!
//! Maps the `month` / `type` query parameters onto pre-generated summary
//! files and produces the JSON body returned to callers.

pub mod aggregate;
pub mod dispatch;
pub mod month;
pub mod store;

pub use aggregate::{AggregateError, MonthlyAggregator};
pub use dispatch::{
    DailyPolicy, DispatchError, ErrorEnvelope, ResponseKind, SummaryResponse, SummaryRouter,
};
pub use month::MonthPolicy;
pub use store::{DirectoryStore, FolderStore, StoreError, StoredFile};

/// Query value of `type` that selects the weekly summary
pub const WEEKLY_TYPE: &str = "weekly";

const WEEKLY_PREFIX: &str = "weekly_summary_";
const DAILY_PREFIX: &str = "attendance_summary_";

/// Which summary a request asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryKind {
    Weekly,
    Daily,
}

impl SummaryKind {
    /// `"weekly"` (exact match) selects the weekly summary, anything else is daily
    pub fn from_type_param(value: Option<&str>) -> Self {
        match value {
            Some(WEEKLY_TYPE) => Self::Weekly,
            _ => Self::Daily,
        }
    }

    /// Deterministic file name for this kind and month
    pub fn file_name(self, month: &str) -> String {
        let prefix = match self {
            Self::Weekly => WEEKLY_PREFIX,
            Self::Daily => DAILY_PREFIX,
        };
        format!("{prefix}{month}.json")
    }
}

/// Parameters of a summary request as received
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryRequest {
    pub month: Option<String>,
    /// Raw `type` parameter, kept for diagnostics
    pub type_param: Option<String>,
}

impl SummaryRequest {
    pub fn new(month: Option<&str>, type_param: Option<&str>) -> Self {
        Self {
            month: month.map(ToString::to_string),
            type_param: type_param.map(ToString::to_string),
        }
    }

    /// Parse from a URL query string (without the leading `?`).
    ///
    /// Values are form-urlencoded; a repeated key keeps its first value.
    pub fn from_query(query: Option<&str>) -> Self {
        let mut request = Self::default();
        let Some(query) = query else {
            return request;
        };

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "month" if request.month.is_none() => request.month = Some(value.into_owned()),
                "type" if request.type_param.is_none() => {
                    request.type_param = Some(value.into_owned());
                }
                _ => {}
            }
        }
        request
    }

    pub fn kind(&self) -> SummaryKind {
        SummaryKind::from_type_param(self.type_param.as_deref())
    }
}
