use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ConnectionTrait};
use serde::{Deserialize, Serialize};

/// Dated percentage-complete report. Normally attached to a work details
/// row; older data attaches it to the work order directly.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_progress")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub work_details_id: Option<i64>,
    pub work_order_id: Option<i64>,
    pub progress: i32,
    pub report_date: NaiveDate,
    pub notes: Option<String>,
    pub evidence_url: Option<String>,
    pub reported_by: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::work_details::Entity",
        from = "Column::WorkDetailsId",
        to = "super::work_details::Column::Id"
    )]
    WorkDetails,
    #[sea_orm(
        belongs_to = "super::work_order::Entity",
        from = "Column::WorkOrderId",
        to = "super::work_order::Column::Id"
    )]
    WorkOrder,
}

impl Related<super::work_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkDetails.def()
    }
}

impl Related<super::work_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrder.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        if insert {
            if let ActiveValue::NotSet = self.created_at {
                self.created_at = ActiveValue::Set(Utc::now());
            }
        }

        Ok(self)
    }
}
