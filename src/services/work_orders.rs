use std::sync::Arc;
use tracing::instrument;

use crate::commands::{Command, MarkPermitUploadedCommand, RecordProgressCommand};
use crate::db::DbPool;
use crate::dto::{PermitRecord, ProgressRecord};
use crate::errors::ServiceError;

/// Writes on work orders and their line items.
#[derive(Clone)]
pub struct WorkOrderService {
    db_pool: Arc<DbPool>,
}

impl WorkOrderService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Appends a progress report to a work details row
    #[instrument(skip(self))]
    pub async fn record_progress(
        &self,
        command: RecordProgressCommand,
    ) -> Result<ProgressRecord, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }

    /// Records an uploaded permit to work
    #[instrument(skip(self))]
    pub async fn mark_permit_uploaded(
        &self,
        command: MarkPermitUploadedCommand,
    ) -> Result<PermitRecord, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }
}
