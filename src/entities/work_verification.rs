use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveModelBehavior, ActiveValue, ConnectionTrait};
use serde::{Deserialize, Serialize};

/// Inspection record for a 100%-complete work details row. An active
/// (non-deleted) row marks the line item as verified.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "work_verification")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub work_details_id: i64,
    pub verification_date: NaiveDate,
    pub verified_by: String,
    pub verification_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::work_details::Entity",
        from = "Column::WorkDetailsId",
        to = "super::work_details::Column::Id"
    )]
    WorkDetails,
}

impl Related<super::work_details::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WorkDetails.def()
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

        self.updated_at = ActiveValue::Set(now);

        Ok(self)
    }
}
