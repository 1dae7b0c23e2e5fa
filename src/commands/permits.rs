use crate::{
    commands::{flatten_transaction_error, Command},
    db::DbPool,
    dto::PermitRecord,
    entities::{permit_to_work, work_order},
    errors::ServiceError,
};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

/// Records the blob reference of an uploaded permit to work. Reuses the work
/// order's live permit row when there is one.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MarkPermitUploadedCommand {
    pub work_order_id: i64,
    #[validate(length(min = 1, max = 2048))]
    pub document_url: String,
    #[validate(length(min = 1))]
    pub uploaded_by: String,
}

#[async_trait::async_trait]
impl Command for MarkPermitUploadedCommand {
    type Result = PermitRecord;

    #[instrument(skip(self, db_pool), fields(work_order_id = self.work_order_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let command = self.clone();
        let saved = db_pool
            .transaction::<_, permit_to_work::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    work_order::Entity::find_by_id(command.work_order_id)
                        .filter(work_order::Column::DeletedAt.is_null())
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Work order {} not found",
                                command.work_order_id
                            ))
                        })?;

                    let existing = permit_to_work::Entity::find()
                        .filter(permit_to_work::Column::WorkOrderId.eq(command.work_order_id))
                        .filter(permit_to_work::Column::DeletedAt.is_null())
                        .order_by_asc(permit_to_work::Column::Id)
                        .one(txn)
                        .await?;

                    let saved = match existing {
                        Some(permit) => {
                            let mut active: permit_to_work::ActiveModel = permit.into();
                            active.is_uploaded = Set(true);
                            active.document_url = Set(Some(command.document_url));
                            active.uploaded_by = Set(Some(command.uploaded_by));
                            active.update(txn).await?
                        }
                        None => {
                            permit_to_work::ActiveModel {
                                work_order_id: Set(command.work_order_id),
                                is_uploaded: Set(true),
                                document_url: Set(Some(command.document_url)),
                                uploaded_by: Set(Some(command.uploaded_by)),
                                deleted_at: Set(None),
                                ..Default::default()
                            }
                            .insert(txn)
                            .await?
                        }
                    };
                    Ok(saved)
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        counter!("shipyard_commands.permit_uploaded", 1);
        info!(permit_id = saved.id, "permit to work marked uploaded");

        Ok(PermitRecord::from(saved))
    }
}
