use crate::{db::DbPool, errors::ServiceError};
use async_trait::async_trait;
use sea_orm::TransactionError;
use std::sync::Arc;

pub mod permits;
pub mod progress;
pub mod verification;

pub use permits::MarkPermitUploadedCommand;
pub use progress::RecordProgressCommand;
pub use verification::{RevokeVerificationCommand, VerifyWorkDetailsCommand};

/// Command trait for implementing the Command Pattern
///
/// A command carries everything one write needs, validates itself and runs
/// inside a single transaction.
#[async_trait]
pub trait Command: Send + Sync {
    /// The return type of the command when executed successfully
    type Result;

    async fn execute(&self, db_pool: Arc<DbPool>) -> Result<Self::Result, ServiceError>;
}

pub(crate) fn flatten_transaction_error(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
        TransactionError::Transaction(err) => err,
    }
}
