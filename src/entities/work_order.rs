use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ConnectionTrait};
use serde::{Deserialize, Serialize};

/// Top-level unit of contracted shipyard work for one vessel.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub vessel_id: Option<i64>,
    pub customer_wo_number: Option<String>,
    pub customer_wo_date: Option<NaiveDate>,
    pub shipyard_wo_number: Option<String>,
    pub shipyard_wo_date: Option<NaiveDate>,
    pub planned_start_date: Option<DateTime<Utc>>,
    pub target_close_date: Option<DateTime<Utc>>,
    pub actual_start_date: Option<DateTime<Utc>>,
    pub actual_close_date: Option<DateTime<Utc>>,
    pub wo_document_delivery_date: Option<NaiveDate>,
    pub wo_document_status: bool,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Model {
    /// Customer and shipyard numbers and dates are all on file.
    pub fn has_complete_documents(&self) -> bool {
        self.customer_wo_number.is_some()
            && self.customer_wo_date.is_some()
            && self.shipyard_wo_number.is_some()
            && self.shipyard_wo_date.is_some()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vessel::Entity",
        from = "Column::VesselId",
        to = "super::vessel::Column::Id"
    )]
    Vessel,
    #[sea_orm(has_many = "super::work_details::Entity")]
    WorkDetails,
    #[sea_orm(has_many = "super::permit_to_work::Entity")]
    Permits,
    #[sea_orm(has_many = "super::work_progress::Entity")]
    Progress,
}

impl Related<super::vessel::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vessel.def()
    }
}

impl Related<super::work_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkDetails.def()
    }
}

impl Related<super::permit_to_work::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Permits.def()
    }
}

impl Related<super::work_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Progress.def()
    }
}

fn presence<V>(value: &ActiveValue<Option<V>>) -> Option<bool>
where
    Option<V>: Into<Value>,
{
    match value {
        ActiveValue::Set(v) | ActiveValue::Unchanged(v) => Some(v.is_some()),
        ActiveValue::NotSet => None,
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = self.created_at {
                self.created_at = ActiveValue::Set(now);
            }
        }

        // Only re-derive when every document field is known to this save.
        let parts = [
            presence(&self.customer_wo_number),
            presence(&self.customer_wo_date),
            presence(&self.shipyard_wo_number),
            presence(&self.shipyard_wo_date),
        ];
        if parts.iter().all(Option::is_some) {
            let complete = parts.iter().all(|p| *p == Some(true));
            self.wo_document_status = ActiveValue::Set(complete);
        } else if insert {
            self.wo_document_status = ActiveValue::Set(false);
        }

        self.updated_at = ActiveValue::Set(now);

        Ok(self)
    }
}
