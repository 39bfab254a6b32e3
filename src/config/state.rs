// Application state module
// Shared, read-only state handed to every connection

use std::sync::Arc;
use tokio::sync::Notify;

use super::types::Config;
use crate::summary::{DailyPolicy, DirectoryStore, SummaryRouter};

/// Application state
pub struct AppState {
    pub config: Config,
    pub router: SummaryRouter<DirectoryStore>,
    /// Notified once when the server should stop accepting connections
    pub shutdown: Arc<Notify>,
}

impl AppState {
    /// State whose router reads both weekly and daily summaries from the configured folder
    pub fn new(config: &Config) -> Self {
        Self::with_daily_policy(config, DailyPolicy::FileLookup)
    }

    /// State with an explicit daily policy, e.g. on-demand aggregation
    pub fn with_daily_policy(config: &Config, daily: DailyPolicy) -> Self {
        let router = SummaryRouter::new(DirectoryStore::new(&config.store.folder))
            .with_daily_policy(daily)
            .with_month_policy(config.summary.month_policy);

        Self {
            config: config.clone(),
            router,
            shutdown: Arc::new(Notify::new()),
        }
    }
}
