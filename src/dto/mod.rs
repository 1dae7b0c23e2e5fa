//! Typed records handed from the fetch layer to the rollup engine, plus the
//! request payloads of the write endpoints.
//!
//! Rows are normalized here once: progress is clamped to 0..=100 and
//! relations that failed to resolve are carried as `None`.

pub mod records;
pub mod requests;

pub use records::{
    BastpRecord, PermitRecord, ProgressRecord, VerificationRecord, VesselRecord,
    WorkDetailsRecord, WorkOrderRecord, WorkOrderRef,
};
pub use requests::{MarkPermitUploadedRequest, RecordProgressRequest, VerifyWorkDetailsRequest};
