use crate::{
    commands::{flatten_transaction_error, Command},
    db::DbPool,
    dto::{ProgressRecord, VerificationRecord},
    entities::{work_details, work_progress, work_verification},
    errors::ServiceError,
    rollup::latest_progress,
};
use chrono::{NaiveDate, Utc};
use metrics::counter;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

/// Records an inspection of a 100%-complete work details row.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct VerifyWorkDetailsCommand {
    pub work_details_id: i64,
    pub verification_date: NaiveDate,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[validate(length(min = 1))]
    pub verified_by: String,
}

#[async_trait::async_trait]
impl Command for VerifyWorkDetailsCommand {
    type Result = VerificationRecord;

    #[instrument(skip(self, db_pool), fields(work_details_id = self.work_details_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let command = self.clone();
        let saved = db_pool
            .transaction::<_, work_verification::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let details_id = command.work_details_id;
                    work_details::Entity::find_by_id(details_id)
                        .filter(work_details::Column::DeletedAt.is_null())
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("Work details {} not found", details_id))
                        })?;

                    let rows: Vec<ProgressRecord> = work_progress::Entity::find()
                        .filter(work_progress::Column::WorkDetailsId.eq(details_id))
                        .all(txn)
                        .await?
                        .into_iter()
                        .map(ProgressRecord::from)
                        .collect();
                    let progress = latest_progress(&rows);
                    if !progress.is_complete() {
                        warn!(current = progress.current, "verification of unfinished work refused");
                        return Err(ServiceError::InvalidOperation(format!(
                            "Work details {} is at {}%, only 100% complete work can be verified",
                            details_id, progress.current
                        )));
                    }

                    let active = work_verification::Entity::find()
                        .filter(work_verification::Column::WorkDetailsId.eq(details_id))
                        .filter(work_verification::Column::DeletedAt.is_null())
                        .count(txn)
                        .await?;
                    if active > 0 {
                        return Err(ServiceError::Conflict(format!(
                            "Work details {} is already verified",
                            details_id
                        )));
                    }

                    let row = work_verification::ActiveModel {
                        work_details_id: Set(details_id),
                        verification_date: Set(command.verification_date),
                        verified_by: Set(command.verified_by),
                        verification_notes: Set(command.notes),
                        deleted_at: Set(None),
                        ..Default::default()
                    };
                    Ok(row.insert(txn).await?)
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        counter!("shipyard_commands.work_verified", 1);
        info!(verification_id = saved.id, "work details verified");

        Ok(VerificationRecord::from(saved))
    }
}

/// Soft-deletes a verification, returning its work details to pending.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RevokeVerificationCommand {
    pub verification_id: i64,
    #[validate(length(min = 1))]
    pub revoked_by: String,
}

#[async_trait::async_trait]
impl Command for RevokeVerificationCommand {
    type Result = VerificationRecord;

    #[instrument(skip(self, db_pool), fields(verification_id = self.verification_id))]
    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError> {
        self.validate()?;

        let verification_id = self.verification_id;
        let revoked = db_pool
            .transaction::<_, work_verification::Model, ServiceError>(|txn| {
                Box::pin(async move {
                    let existing = work_verification::Entity::find_by_id(verification_id)
                        .filter(work_verification::Column::DeletedAt.is_null())
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!(
                                "Verification {} not found",
                                verification_id
                            ))
                        })?;

                    let mut active: work_verification::ActiveModel = existing.into();
                    active.deleted_at = Set(Some(Utc::now()));
                    Ok(active.update(txn).await?)
                })
            })
            .await
            .map_err(flatten_transaction_error)?;

        counter!("shipyard_commands.verification_revoked", 1);
        info!(
            work_details_id = revoked.work_details_id,
            revoked_by = %self.revoked_by,
            "verification revoked"
        );

        Ok(VerificationRecord::from(revoked))
    }
}
