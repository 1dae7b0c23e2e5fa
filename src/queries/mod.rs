//! Read side: one struct per fetch, each returning typed records ready for
//! the rollup engine. Soft-deleted rows never leave this module.

use crate::errors::ServiceError;
use async_trait::async_trait;
use sea_orm::DatabaseConnection;

pub mod snapshot;
pub mod verification;

pub use snapshot::{ListVesselsQuery, ListWorkOrderSnapshotQuery};
pub use verification::{ListActiveVerificationsQuery, ListBastpQuery, ListCompletionCandidatesQuery};

#[async_trait]
pub trait Query: Send + Sync {
    type Result: Send + Sync;

    async fn execute(&self, db_pool: &DatabaseConnection) -> Result<Self::Result, ServiceError>;
}
