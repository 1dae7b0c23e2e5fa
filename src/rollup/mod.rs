//! Status rollup engine.
//!
//! Pure functions from fetched records to the derived views: dashboard
//! statistics and alerts, per-vessel summaries and the verification
//! pipeline. Nothing here touches the database or the clock; callers pass
//! `now` explicitly.

pub mod alerts;
pub mod dashboard;
pub mod progress;
pub mod status;
pub mod verification;
pub mod vessels;

#[cfg(test)]
pub(crate) mod testing;

use chrono::Duration;

pub use alerts::{Alert, AlertKind, AlertPriority};
pub use dashboard::{build_dashboard, DashboardStats, DashboardView, WorkOrderSummary};
pub use progress::{latest_progress, work_order_progress, ProgressState};
pub use status::{classify, classify_with, StatusRule, WorkOrderStatus};
pub use verification::{
    build_pipeline, BastpGroup, VerificationFilter, VerificationItem, VerificationPipeline,
    VerificationSummary,
};
pub use vessels::{
    apply_vessel_query, summarize_vessels, SortDirection, VesselQuery, VesselSortKey,
    VesselSummary,
};

pub const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollupOptions {
    /// How far ahead a target close date raises `upcoming_deadline`
    pub upcoming_window: Duration,
    /// Rule behind the dashboard status counts and table
    pub status_rule: StatusRule,
}

impl Default for RollupOptions {
    fn default() -> Self {
        Self {
            upcoming_window: Duration::days(DEFAULT_UPCOMING_WINDOW_DAYS),
            status_rule: StatusRule::default(),
        }
    }
}

pub(crate) fn fold(value: &str) -> String {
    value.to_lowercase()
}

/// `needle` must already be folded. Missing fields never match.
pub(crate) fn contains_folded(field: Option<&str>, needle: &str) -> bool {
    field.is_some_and(|value| fold(value).contains(needle))
}
