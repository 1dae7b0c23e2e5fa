use async_trait::async_trait;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, instrument};

use super::Query;
use crate::dto::{PermitRecord, ProgressRecord, VesselRecord, WorkDetailsRecord, WorkOrderRecord};
use crate::entities::{permit_to_work, vessel, work_details, work_order, work_progress};
use crate::errors::ServiceError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListVesselsQuery;

#[async_trait]
impl Query for ListVesselsQuery {
    type Result = Vec<VesselRecord>;

    #[instrument(skip(self, db_pool))]
    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let vessels = vessel::Entity::find()
            .order_by_asc(vessel::Column::Name)
            .all(db_pool)
            .await
            .map_err(ServiceError::db_error)?;
        Ok(vessels.into_iter().map(VesselRecord::from).collect())
    }
}

/// Live work orders with their vessel, line items, progress rows and permits
/// embedded. Newest first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListWorkOrderSnapshotQuery {
    pub vessel_id: Option<i64>,
}

fn group_by<K, T>(rows: impl IntoIterator<Item = (K, T)>) -> HashMap<K, Vec<T>>
where
    K: std::hash::Hash + Eq,
{
    let mut grouped: HashMap<K, Vec<T>> = HashMap::new();
    for (key, row) in rows {
        grouped.entry(key).or_default().push(row);
    }
    grouped
}

#[async_trait]
impl Query for ListWorkOrderSnapshotQuery {
    type Result = Vec<WorkOrderRecord>;

    #[instrument(skip(self, db_pool), fields(vessel_id = ?self.vessel_id))]
    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError> {
        let mut select = work_order::Entity::find().filter(work_order::Column::DeletedAt.is_null());
        if let Some(vessel_id) = self.vessel_id {
            select = select.filter(work_order::Column::VesselId.eq(vessel_id));
        }
        let orders = select
            .order_by_desc(work_order::Column::CreatedAt)
            .order_by_desc(work_order::Column::Id)
            .all(db_pool)
            .await
            .map_err(ServiceError::db_error)?;

        if orders.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<i64> = orders.iter().map(|o| o.id).collect();
        let vessel_ids: Vec<i64> = orders.iter().filter_map(|o| o.vessel_id).collect();

        let (vessels, details, direct_progress, permits) = tokio::try_join!(
            vessel::Entity::find()
                .filter(vessel::Column::Id.is_in(vessel_ids))
                .all(db_pool),
            work_details::Entity::find()
                .filter(work_details::Column::WorkOrderId.is_in(order_ids.clone()))
                .filter(work_details::Column::DeletedAt.is_null())
                .order_by_asc(work_details::Column::Id)
                .all(db_pool),
            work_progress::Entity::find()
                .filter(work_progress::Column::WorkOrderId.is_in(order_ids.clone()))
                .filter(work_progress::Column::WorkDetailsId.is_null())
                .all(db_pool),
            permit_to_work::Entity::find()
                .filter(permit_to_work::Column::WorkOrderId.is_in(order_ids))
                .filter(permit_to_work::Column::DeletedAt.is_null())
                .all(db_pool),
        )
        .map_err(ServiceError::db_error)?;

        let detail_ids: Vec<i64> = details.iter().map(|d| d.id).collect();
        let detail_progress = if detail_ids.is_empty() {
            Vec::new()
        } else {
            work_progress::Entity::find()
                .filter(work_progress::Column::WorkDetailsId.is_in(detail_ids))
                .all(db_pool)
                .await
                .map_err(ServiceError::db_error)?
        };

        debug!(
            work_orders = orders.len(),
            work_details = details.len(),
            progress_rows = direct_progress.len() + detail_progress.len(),
            permits = permits.len(),
            "work order snapshot fetched"
        );

        let vessels: HashMap<i64, VesselRecord> = vessels
            .into_iter()
            .map(|v| (v.id, VesselRecord::from(v)))
            .collect();
        let mut progress_by_details = group_by(detail_progress.into_iter().filter_map(|p| {
            p.work_details_id.map(|id| (id, ProgressRecord::from(p)))
        }));
        let mut progress_by_order = group_by(direct_progress.into_iter().filter_map(|p| {
            p.work_order_id.map(|id| (id, ProgressRecord::from(p)))
        }));
        let mut permits_by_order = group_by(
            permits
                .into_iter()
                .map(|p| (p.work_order_id, PermitRecord::from(p))),
        );
        let mut details_by_order = group_by(details.into_iter().map(|d| {
            let progress = progress_by_details.remove(&d.id).unwrap_or_default();
            (d.work_order_id, WorkDetailsRecord::from_model(d, progress, None))
        }));

        Ok(orders
            .into_iter()
            .map(|order| {
                let id = order.id;
                let vessel = order.vessel_id.and_then(|vid| vessels.get(&vid).cloned());
                WorkOrderRecord::from_model(
                    order,
                    vessel,
                    details_by_order.remove(&id).unwrap_or_default(),
                    progress_by_order.remove(&id).unwrap_or_default(),
                    permits_by_order.remove(&id).unwrap_or_default(),
                )
            })
            .collect())
    }
}
