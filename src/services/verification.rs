use std::sync::Arc;
use tracing::{debug, instrument};

use crate::commands::{Command, RevokeVerificationCommand, VerifyWorkDetailsCommand};
use crate::db::DbPool;
use crate::dto::{BastpRecord, VerificationRecord, WorkDetailsRecord};
use crate::errors::ServiceError;
use crate::queries::{
    ListActiveVerificationsQuery, ListBastpQuery, ListCompletionCandidatesQuery, Query,
};
use crate::rollup::{build_pipeline, VerificationFilter, VerificationPipeline};
use crate::services::views::{SequencedView, ViewEnvelope};

#[derive(Debug, Clone, Default)]
pub struct VerificationSnapshot {
    pub details: Vec<WorkDetailsRecord>,
    pub verifications: Vec<VerificationRecord>,
    pub bastps: Vec<BastpRecord>,
}

/// Verification pipeline view plus the verify/revoke writes.
#[derive(Clone)]
pub struct VerificationService {
    db_pool: Arc<DbPool>,
    view: Arc<SequencedView<VerificationSnapshot>>,
}

impl VerificationService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self {
            db_pool,
            view: Arc::new(SequencedView::new("verification")),
        }
    }

    async fn fetch(&self) -> Result<VerificationSnapshot, ServiceError> {
        let candidates = ListCompletionCandidatesQuery;
        let active = ListActiveVerificationsQuery;
        let documents = ListBastpQuery;
        let (details, verifications, bastps) = tokio::try_join!(
            candidates.execute(&self.db_pool),
            active.execute(&self.db_pool),
            documents.execute(&self.db_pool),
        )?;
        Ok(VerificationSnapshot {
            details,
            verifications,
            bastps,
        })
    }

    #[instrument(skip(self))]
    pub async fn refresh(
        &self,
        filter: &VerificationFilter,
    ) -> Result<ViewEnvelope<VerificationPipeline>, ServiceError> {
        let ticket = self.view.begin();
        let result = self.fetch().await;
        let published = self.view.complete(ticket, result)?;

        let snapshot = &published.data;
        let pipeline = build_pipeline(
            &snapshot.details,
            &snapshot.verifications,
            &snapshot.bastps,
            filter,
        );
        debug!(
            completed = pipeline.summary.completed,
            pending = pipeline.summary.pending,
            verified = pipeline.summary.verified,
            "verification pipeline built"
        );
        Ok(published.envelope(pipeline))
    }

    #[instrument(skip(self))]
    pub async fn verify(
        &self,
        command: VerifyWorkDetailsCommand,
    ) -> Result<VerificationRecord, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }

    #[instrument(skip(self))]
    pub async fn revoke(
        &self,
        command: RevokeVerificationCommand,
    ) -> Result<VerificationRecord, ServiceError> {
        command.execute(self.db_pool.clone()).await
    }
}
