use chrono::{DateTime, Utc};
use metrics::counter;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, instrument};

use crate::db::DbPool;
use crate::dto::WorkOrderRecord;
use crate::errors::ServiceError;
use crate::queries::{ListWorkOrderSnapshotQuery, Query};
use crate::rollup::{build_dashboard, DashboardView, RollupOptions};
use crate::services::views::{SequencedView, ViewEnvelope};

/// Dashboard statistics, alerts and the work order table.
///
/// The snapshot fetch is the one bounded read path: it fails with
/// `ServiceError::Timeout` once `fetch_timeout` elapses.
#[derive(Clone)]
pub struct DashboardService {
    db_pool: Arc<DbPool>,
    view: Arc<SequencedView<Vec<WorkOrderRecord>>>,
    options: RollupOptions,
    fetch_timeout: Duration,
}

impl DashboardService {
    pub fn new(db_pool: Arc<DbPool>, options: RollupOptions, fetch_timeout: Duration) -> Self {
        Self {
            db_pool,
            view: Arc::new(SequencedView::new("dashboard")),
            options,
            fetch_timeout,
        }
    }

    /// Runs `fetch` under the configured bound.
    async fn bounded<F>(&self, fetch: F) -> Result<Vec<WorkOrderRecord>, ServiceError>
    where
        F: Future<Output = Result<Vec<WorkOrderRecord>, ServiceError>>,
    {
        match tokio::time::timeout(self.fetch_timeout, fetch).await {
            Ok(result) => result,
            Err(_) => {
                counter!("shipyard_view.timeouts", 1, "view" => "dashboard");
                Err(ServiceError::Timeout(format!(
                    "dashboard fetch exceeded {:?}",
                    self.fetch_timeout
                )))
            }
        }
    }

    async fn publish<F>(
        &self,
        now: DateTime<Utc>,
        fetch: F,
    ) -> Result<ViewEnvelope<DashboardView>, ServiceError>
    where
        F: Future<Output = Result<Vec<WorkOrderRecord>, ServiceError>>,
    {
        let ticket = self.view.begin();
        let result = self.bounded(fetch).await;
        let published = self.view.complete(ticket, result)?;

        let dashboard = build_dashboard(&published.data, now, &self.options);
        info!(
            sequence = published.sequence,
            stale = published.is_stale(),
            work_orders = dashboard.stats.total_work_orders,
            alerts = dashboard.alerts.len(),
            "dashboard refreshed"
        );
        Ok(published.envelope(dashboard))
    }

    #[instrument(skip(self))]
    pub async fn refresh(
        &self,
        now: DateTime<Utc>,
    ) -> Result<ViewEnvelope<DashboardView>, ServiceError> {
        let query = ListWorkOrderSnapshotQuery::default();
        self.publish(now, query.execute(&self.db_pool)).await
    }
}
