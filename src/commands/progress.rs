use crate::{
    commands::{flatten_transaction_error, Command},
    db::DbPool,
    dto::ProgressRecord,
    entities::{work_details, work_progress},
    errors::ServiceError,
};
use chrono::NaiveDate;
use metrics::counter;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RecordProgressCommand {
    pub work_details_id: i64,
    #[validate(range(min = 0, max = 100, message = "Progress must be between 0 and 100"))]
    pub progress: i32,
    pub report_date: NaiveDate,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 1, max = 2048))]
    pub evidence_url: Option<String>,
    #[validate(length(min = 1))]
    pub reported_by: String,
}

#[async_trait::async_trait]
impl Command for RecordProgressCommand {
    type Result = ProgressRecord;

    #[instrument(skip(self, db_pool), fields(work_details_id = self.work_details_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let command = self.clone();
        let saved = db_pool
            .transaction::<_, work_progress::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    work_details::Entity::find_by_id(command.work_details_id)
                        .filter(work_details::Column::DeletedAt.is_null())
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Work details {} not found",
                                command.work_details_id
                            ))
                        })?;

                    let row = work_progress::ActiveModel {
                        work_details_id: Set(Some(command.work_details_id)),
                        work_order_id: Set(None),
                        progress: Set(command.progress),
                        report_date: Set(command.report_date),
                        notes: Set(command.notes),
                        evidence_url: Set(command.evidence_url),
                        reported_by: Set(Some(command.reported_by)),
                        ..Default::default()
                    };
                    Ok(row.insert(txn).await?)
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        counter!("shipyard_commands.progress_recorded", 1);
        info!(
            progress_id = saved.id,
            progress = saved.progress,
            report_date = %saved.report_date,
            "progress recorded"
        );

        Ok(ProgressRecord::from(saved))
    }
}
