use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, instrument};

use crate::db::DbPool;
use crate::dto::{VesselRecord, WorkOrderRecord};
use crate::errors::ServiceError;
use crate::queries::{ListVesselsQuery, ListWorkOrderSnapshotQuery, Query};
use crate::rollup::{apply_vessel_query, summarize_vessels, VesselQuery, VesselSummary};
use crate::services::views::{SequencedView, ViewEnvelope};

#[derive(Debug, Clone, Default)]
pub struct VesselSnapshot {
    pub vessels: Vec<VesselRecord>,
    pub work_orders: Vec<WorkOrderRecord>,
}

/// Vessel-grouped work order counts.
#[derive(Clone)]
pub struct VesselService {
    db_pool: Arc<DbPool>,
    view: Arc<SequencedView<VesselSnapshot>>,
}

impl VesselService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            db_pool,
            view: Arc::new(SequencedView::new("vessels")),
        }
    }

    async fn fetch(&self) -> Result<VesselSnapshot, ServiceError> {
        let vessels_query = ListVesselsQuery;
        let orders_query = ListWorkOrderSnapshotQuery::default();
        let (vessels, work_orders) = tokio::try_join!(
            vessels_query.execute(&self.db_pool),
            orders_query.execute(&self.db_pool),
        )?;
        Ok(VesselSnapshot {
            vessels,
            work_orders,
        })
    }

    #[instrument(skip(self))]
    pub async fn refresh(
        &self,
        query: &VesselQuery,
        now: DateTime<Utc>,
    ) -> Result<ViewEnvelope<Vec<VesselSummary>>, ServiceError> {
        let ticket = self.view.begin();
        let result = self.fetch().await;
        let published = self.view.complete(ticket, result)?;

        let summaries = summarize_vessels(&published.data.work_orders, &published.data.vessels, now);
        let summaries = apply_vessel_query(summaries, query);
        debug!(vessels = summaries.len(), stale = published.is_stale(), "vessel summaries built");
        Ok(published.envelope(summaries))
    }
}
