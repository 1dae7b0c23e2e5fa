use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ConnectionTrait};
use serde::{Deserialize, Serialize};

/// Line item under a work order.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_details")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub work_order_id: i64,
    pub description: Option<String>,
    pub location: Option<String>,
    pub quantity: Option<Decimal>,
    pub uom: Option<String>,
    pub pic: Option<String>,
    pub planned_start_date: Option<NaiveDate>,
    pub target_close_date: Option<NaiveDate>,
    pub actual_start_date: Option<NaiveDate>,
    pub actual_close_date: Option<NaiveDate>,
    pub storage_path: Option<String>,
    pub is_bastp_included: bool,
    pub bastp_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::work_order::Entity",
        from = "Column::WorkOrderId",
        to = "super::work_order::Column::Id"
    )]
    WorkOrder,
    #[sea_orm(
        belongs_to = "super::bastp::Entity",
        from = "Column::BastpId",
        to = "super::bastp::Column::Id"
    )]
    Bastp,
    #[sea_orm(has_many = "super::work_progress::Entity")]
    Progress,
    #[sea_orm(has_many = "super::work_verification::Entity")]
    Verifications,
}

impl Related<super::work_order::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkOrder.def()
    }
}

impl Related<super::bastp::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Bastp.def()
    }
}

impl Related<super::work_progress::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Progress.def()
    }
}

impl Related<super::work_verification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Verifications.def()
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
            if let ActiveValue::NotSet = self.is_bastp_included {
                self.is_bastp_included = ActiveValue::Set(false);
            }
        }

        self.updated_at = ActiveValue::Set(now);

        Ok(self)
    }
}
