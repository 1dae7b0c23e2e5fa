use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::Query;
use crate::dto::{
    BastpRecord, ProgressRecord, VerificationRecord, VesselRecord, WorkDetailsRecord,
    WorkOrderRef,
};
use crate::entities::{bastp, vessel, work_details, work_order, work_progress, work_verification};
use crate::errors::ServiceError;

/// Live work details of live work orders, with progress rows and a work
/// order/vessel summary embedded.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListCompletionCandidatesQuery;

#[async_trait]
impl Query for ListCompletionCandidatesQuery {
    type Result = Vec<WorkDetailsRecord>;

    #[instrument(skip(self, db_pool))]
    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let (details, orders) = tokio::try_join!(
            work_details::Entity::find()
                .filter(work_details::Column::DeletedAt.is_null())
                .order_by_asc(work_details::Column::Id)
                .all(db_pool),
            work_order::Entity::find()
                .filter(work_order::Column::DeletedAt.is_null())
                .all(db_pool),
        )
        .map_err(ServiceError::db_error)?;

        let orders: HashMap<i64, work_order::Model> =
            orders.into_iter().map(|o| (o.id, o)).collect();
        let details: Vec<work_details::Model> = details
            .into_iter()
            .filter(|d| orders.contains_key(&d.work_order_id))
            .collect();
        if details.is_empty() {
            return Ok(Vec::new());
        }

        let detail_ids: Vec<i64> = details.iter().map(|d| d.id).collect();
        let vessel_ids: Vec<i64> = orders.values().filter_map(|o| o.vessel_id).collect();

        let (progress, vessels) = tokio::try_join!(
            work_progress::Entity::find()
                .filter(work_progress::Column::WorkDetailsId.is_in(detail_ids))
                .all(db_pool),
            vessel::Entity::find()
                .filter(vessel::Column::Id.is_in(vessel_ids))
                .all(db_pool),
        )
        .map_err(ServiceError::db_error)?;

        debug!(
            work_details = details.len(),
            progress_rows = progress.len(),
            "completion candidates fetched"
        );

        let vessels: HashMap<i64, VesselRecord> = vessels
            .into_iter()
            .map(|v| (v.id, VesselRecord::from(v)))
            .collect();
        let mut progress_by_details: HashMap<i64, Vec<ProgressRecord>> = HashMap::new();
        for row in progress {
            if let Some(details_id) = row.work_details_id {
                progress_by_details
                    .entry(details_id)
                    .or_default()
                    .push(ProgressRecord::from(row));
            }
        }

        Ok(details
            .into_iter()
            .map(|d| {
                let work_order = orders.get(&d.work_order_id).map(|order| {
                    let vessel = order.vessel_id.and_then(|vid| vessels.get(&vid).cloned());
                    WorkOrderRef::from_model(order, vessel)
                });
                let progress = progress_by_details.remove(&d.id).unwrap_or_default();
                WorkDetailsRecord::from_model(d, progress, work_order)
            })
            .collect())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListActiveVerificationsQuery;

#[async_trait]
impl Query for ListActiveVerificationsQuery {
    type Result = Vec<VerificationRecord>;

    #[instrument(skip(self, db_pool))]
    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let rows = work_verification::Entity::find()
            .filter(work_verification::Column::DeletedAt.is_null())
            .order_by_asc(work_verification::Column::Id)
            .all(db_pool)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(rows.into_iter().map(VerificationRecord::from).collect())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListBastpQuery;

#[async_trait]
impl Query for ListBastpQuery {
    type Result = Vec<BastpRecord>;

    #[instrument(skip(self, db_pool))]
    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let rows = bastp::Entity::find()
            .filter(bastp::Column::DeletedAt.is_null())
            .order_by_desc(bastp::Column::Date)
            .all(db_pool)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(rows.into_iter().map(BastpRecord::from).collect())
    }
}
